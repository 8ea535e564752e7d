//! Physics world for one shelf session.
//!
//! A [`ShelfWorld`] owns every rapier set for the session: the invisible jar
//! boundaries (ground and two walls), the shelves, one ball per catalog item and
//! the pointer constraint. Tearing it down clears all of them at once and detaches
//! the pointer listener; handles minted by a torn-down world resolve to nothing.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use rapier2d::{geometry::DefaultBroadPhase, prelude::*};
use tracing::{debug, info};

use crate::config::PhysicsConfig;
use crate::input::PointerSurface;
use crate::physics::{
    px_to_m, BodyParams, BodySnapshot, BOUNDARY_THICKNESS_PX, GROUP_BOUNDARY, GROUP_COOKIE,
    SHELF_THICKNESS_PX,
};
use crate::pointer::PointerConstraint;
use crate::shelf::Shelf;
use crate::viewport::ViewportSize;

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("viewport {width}x{height} cannot hold a world")]
    DegenerateViewport { width: f32, height: f32 },
    #[error("pointer surface is unavailable")]
    SurfaceUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(u64);

/// Handle to a cookie body, valid only for the world that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    world: WorldId,
    raw: RigidBodyHandle,
}

impl BodyHandle {
    pub fn world(&self) -> WorldId {
        self.world
    }
}

/// Everything needed to insert one cookie body.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub item_id: u32,
    pub label: String,
    pub radius_px: f32,
    pub position_px: [f32; 2],
    pub rotation: Real,
    pub params: BodyParams,
}

impl BodySpec {
    /// Randomized spawn: anywhere across the viewport width, somewhere in the band
    /// above the top edge, at any angle. Cookies fall into view on the first steps.
    pub fn spawn<R: Rng>(
        item_id: u32,
        label: impl Into<String>,
        radius_px: f32,
        params: BodyParams,
        viewport: ViewportSize,
        spawn_band: f32,
        rng: &mut R,
    ) -> Self {
        let min_x = radius_px.min(viewport.width / 2.0);
        let max_x = (viewport.width - radius_px).max(min_x + f32::EPSILON);
        let x = rng.gen_range(min_x..max_x);
        let y = -radius_px - rng.gen_range(0.0..spawn_band.max(f32::EPSILON));
        Self {
            item_id,
            label: label.into(),
            radius_px,
            position_px: [x, y],
            rotation: rng.gen_range(0.0..std::f32::consts::TAU),
            params,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieBody {
    pub item_id: u32,
    pub label: String,
    pub handle: BodyHandle,
    pub radius_px: f32,
}

pub struct ShelfWorld {
    id: WorldId,
    viewport: ViewportSize,
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pub(crate) island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) rigid_body_set: RigidBodySet,
    pub(crate) collider_set: ColliderSet,
    pub(crate) impulse_joint_set: ImpulseJointSet,
    pub(crate) multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    boundaries: Vec<RigidBodyHandle>,
    shelf_count: usize,
    pub(crate) cookies: Vec<CookieBody>,
    pub(crate) pointer: Option<PointerConstraint>,
    time: Real,
    destroyed: bool,
}

impl ShelfWorld {
    /// Build the boundaries for `viewport` and hook the pointer constraint to `surface`.
    ///
    /// Fails without leaving anything behind when the viewport is degenerate or the
    /// surface refuses listeners.
    pub fn create(
        viewport: ViewportSize,
        surface: &Rc<PointerSurface>,
        physics: &PhysicsConfig,
    ) -> Result<Self, WorldError> {
        if viewport.is_degenerate() {
            return Err(WorldError::DegenerateViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if !surface.is_available() {
            return Err(WorldError::SurfaceUnavailable);
        }

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = physics.fixed_timestep;

        let mut world = Self {
            id: WorldId(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed)),
            viewport,
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, physics.gravity],
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            boundaries: Vec::new(),
            shelf_count: 0,
            cookies: Vec::new(),
            pointer: None,
            time: 0.0,
            destroyed: false,
        };

        // Invisible jar: ground just below the viewport, walls just beyond each side.
        let (w, h) = (viewport.width, viewport.height);
        let t = BOUNDARY_THICKNESS_PX;
        world.insert_boundary([w / 2.0, h + t / 2.0], [w / 2.0, t / 2.0]);
        world.insert_boundary([-t / 2.0, h / 2.0], [t / 2.0, h]);
        world.insert_boundary([w + t / 2.0, h / 2.0], [t / 2.0, h]);

        let pointer = PointerConstraint::attach(
            Rc::clone(surface),
            physics.pointer_stiffness,
            physics.pointer_damping,
        )
        .ok_or(WorldError::SurfaceUnavailable)?;
        world.pointer = Some(pointer);

        info!(world = world.id.0, width = w, height = h, "shelf world created");
        Ok(world)
    }

    fn insert_boundary(&mut self, center_px: [f32; 2], half_extents_px: [f32; 2]) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![px_to_m(center_px[0]), px_to_m(center_px[1])])
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::cuboid(px_to_m(half_extents_px[0]), px_to_m(half_extents_px[1]))
            .restitution(0.0)
            .friction(0.9)
            .collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(GROUP_BOUNDARY),
                Group::from_bits_truncate(GROUP_COOKIE),
            ))
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.boundaries.push(handle);
        handle
    }

    pub fn add_shelf(&mut self, shelf: &Shelf) {
        if self.destroyed {
            return;
        }
        self.insert_boundary(shelf.center, [shelf.width / 2.0, SHELF_THICKNESS_PX / 2.0]);
        self.shelf_count += 1;
    }

    pub fn add_body(&mut self, spec: BodySpec) -> Option<BodyHandle> {
        if self.destroyed {
            return None;
        }
        let [x, y] = spec.position_px;
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![px_to_m(x), px_to_m(y)])
            .rotation(spec.rotation)
            .build();
        let raw = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::ball(px_to_m(spec.radius_px))
            .restitution(spec.params.restitution)
            .friction(spec.params.friction)
            .density(spec.params.density)
            .collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(GROUP_COOKIE),
                Group::from_bits_truncate(GROUP_BOUNDARY | GROUP_COOKIE),
            ))
            .build();
        self.collider_set
            .insert_with_parent(collider, raw, &mut self.rigid_body_set);

        let handle = BodyHandle { world: self.id, raw };
        debug!(item = spec.item_id, x, y, "cookie body added");
        self.cookies.push(CookieBody {
            item_id: spec.item_id,
            label: spec.label,
            handle,
            radius_px: spec.radius_px,
        });
        Some(handle)
    }

    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(raw) = self.resolve(handle) else {
            return false;
        };
        if self.grabbed_body() == Some(handle) {
            self.release_grab();
        }
        let removed = self
            .rigid_body_set
            .remove(
                raw,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some();
        self.cookies.retain(|cookie| cookie.handle != handle);
        removed
    }

    pub fn step(&mut self) {
        if self.destroyed {
            return;
        }
        let physics_hooks = ();
        let event_handler = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &physics_hooks,
            &event_handler,
        );
        self.time += self.integration_parameters.dt;
    }

    /// Raw rapier handle for `handle`, if it still belongs to this live world.
    pub(crate) fn resolve(&self, handle: BodyHandle) -> Option<RigidBodyHandle> {
        if self.destroyed || handle.world != self.id {
            return None;
        }
        self.rigid_body_set.contains(handle.raw).then_some(handle.raw)
    }

    pub(crate) fn handle_for(&self, raw: RigidBodyHandle) -> BodyHandle {
        BodyHandle { world: self.id, raw }
    }

    pub fn body_snapshot(&self, handle: BodyHandle) -> Option<BodySnapshot> {
        let raw = self.resolve(handle)?;
        self.rigid_body_set.get(raw).map(|body| BodySnapshot {
            position: [body.translation().x, body.translation().y],
            velocity: [body.linvel().x, body.linvel().y],
            rotation: body.rotation().angle(),
            angular_velocity: body.angvel(),
            is_static: body.is_fixed(),
        })
    }

    /// Switch a cookie between fixed and dynamic. Going fixed zeroes its motion first.
    pub fn set_static(&mut self, handle: BodyHandle, is_static: bool) -> bool {
        let Some(raw) = self.resolve(handle) else {
            return false;
        };
        let Some(body) = self.rigid_body_set.get_mut(raw) else {
            return false;
        };
        if is_static {
            body.set_linvel(vector![0.0, 0.0], false);
            body.set_angvel(0.0, false);
            body.set_body_type(RigidBodyType::Fixed, false);
        } else {
            body.set_body_type(RigidBodyType::Dynamic, true);
        }
        true
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, linvel: [f32; 2], angvel: Real) -> bool {
        self.with_body(handle, |body| {
            body.set_linvel(vector![linvel[0], linvel[1]], true);
            body.set_angvel(angvel, true);
        })
    }

    /// Add `delta` (m/s) to the body's linear velocity: an impulse per unit mass.
    pub fn add_velocity(&mut self, handle: BodyHandle, delta: [f32; 2]) -> bool {
        self.with_body(handle, |body| {
            let linvel = *body.linvel() + vector![delta[0], delta[1]];
            body.set_linvel(linvel, true);
        })
    }

    pub fn set_position_px(&mut self, handle: BodyHandle, position_px: [f32; 2]) -> bool {
        self.with_body(handle, |body| {
            body.set_translation(vector![px_to_m(position_px[0]), px_to_m(position_px[1])], true);
        })
    }

    fn with_body(&mut self, handle: BodyHandle, f: impl FnOnce(&mut RigidBody)) -> bool {
        let Some(raw) = self.resolve(handle) else {
            return false;
        };
        match self.rigid_body_set.get_mut(raw) {
            Some(body) => {
                f(body);
                true
            }
            None => false,
        }
    }

    /// Topmost cookie whose disc contains the viewport point.
    pub fn cookie_at_px(&self, x: f32, y: f32) -> Option<&CookieBody> {
        self.cookies.iter().rev().find(|cookie| {
            self.body_snapshot(cookie.handle).is_some_and(|snapshot| {
                let [cx, cy] = snapshot.position_px();
                (cx - x).hypot(cy - y) <= cookie.radius_px
            })
        })
    }

    pub fn cookies(&self) -> &[CookieBody] {
        &self.cookies
    }

    pub fn body_count(&self) -> usize {
        self.cookies.len()
    }

    /// Ground, walls and shelves.
    pub fn boundary_count(&self) -> usize {
        self.boundaries.len()
    }

    pub fn shelf_count(&self) -> usize {
        self.shelf_count
    }

    /// Every rigid body in the engine, cursor body included.
    pub fn rigid_body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Release the pointer listener and every body, joint and collider.
    ///
    /// Idempotent; also runs on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(mut pointer) = self.pointer.take() {
            pointer.detach();
        }
        let bodies = self.cookies.len();
        self.cookies.clear();
        self.boundaries.clear();
        self.shelf_count = 0;
        self.rigid_body_set = RigidBodySet::new();
        self.collider_set = ColliderSet::new();
        self.impulse_joint_set = ImpulseJointSet::new();
        self.multibody_joint_set = MultibodyJointSet::new();
        self.island_manager = IslandManager::new();
        self.broad_phase = DefaultBroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.ccd_solver = CCDSolver::new();
        self.destroyed = true;
        info!(world = self.id.0, bodies, "shelf world destroyed");
    }
}

impl Drop for ShelfWorld {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for ShelfWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShelfWorld")
            .field("id", &self.id)
            .field("viewport", &self.viewport)
            .field("bodies", &self.cookies.len())
            .field("boundaries", &self.boundaries.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
