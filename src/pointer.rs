use std::rc::Rc;

use rapier2d::prelude::*;
use tracing::debug;

use crate::input::{ListenerId, PointerEvent, PointerSurface};
use crate::physics::{m_to_px, px_to_m};
use crate::viewport::screen_to_world;
use crate::world::{BodyHandle, ShelfWorld};

/// State for a cookie currently held by the pointer
#[derive(Debug, Clone)]
pub struct GrabState {
    pub cursor_body_handle: RigidBodyHandle,
    pub joint_handle: ImpulseJointHandle,
    pub grabbed_body_handle: RigidBodyHandle,
    pub anchor_point: Point<Real>, // Local point on the grabbed body
}

/// Spring link between the pointer and whichever cookie it grips.
///
/// The cursor is a kinematic body with no collider; while a cookie is held a
/// spring joint pulls the grabbed point toward it, so drags feel elastic.
#[derive(Debug)]
pub struct PointerConstraint {
    surface: Rc<PointerSurface>,
    listener: Option<ListenerId>,
    stiffness: Real,
    damping: Real,
    pub(crate) grab: Option<GrabState>,
}

impl PointerConstraint {
    pub(crate) fn attach(surface: Rc<PointerSurface>, stiffness: Real, damping: Real) -> Option<Self> {
        let listener = surface.attach()?;
        Some(Self {
            surface,
            listener: Some(listener),
            stiffness,
            damping,
            grab: None,
        })
    }

    /// Stop listening. The grab is forgotten; its bodies go with the world's sets.
    pub(crate) fn detach(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.surface.detach(listener);
        }
        self.grab = None;
    }

    fn drain(&self) -> Vec<PointerEvent> {
        self.listener
            .map(|listener| self.surface.drain(listener))
            .unwrap_or_default()
    }

    pub fn stiffness(&self) -> Real {
        self.stiffness
    }

    pub fn damping(&self) -> Real {
        self.damping
    }
}

impl Drop for PointerConstraint {
    fn drop(&mut self) {
        self.detach();
    }
}

impl ShelfWorld {
    /// Apply every pointer event queued since the last call. Returns how many were handled.
    pub fn pump_pointer(&mut self) -> usize {
        let events = match &self.pointer {
            Some(pointer) => pointer.drain(),
            None => return 0,
        };
        for event in &events {
            match *event {
                PointerEvent::Down { x, y } => {
                    self.try_grab_at_point(screen_to_world(x, y));
                }
                PointerEvent::Move { x, y } => self.update_cursor(screen_to_world(x, y)),
                PointerEvent::Up => self.release_grab(),
            }
        }
        events.len()
    }

    /// Query which dynamic cookie (if any) covers the given world point
    fn query_cookie_at_point(&self, world_point: Point<Real>) -> Option<RigidBodyHandle> {
        self.cookies.iter().rev().find_map(|cookie| {
            let raw = self.resolve(cookie.handle)?;
            let body = self.rigid_body_set.get(raw)?;
            if !body.is_dynamic() {
                return None;
            }
            let distance = (body.translation() - world_point.coords).norm();
            (distance <= px_to_m(cookie.radius_px)).then_some(raw)
        })
    }

    /// Grip the cookie under `world_point`, if any. Any previous grip is released first.
    pub fn try_grab_at_point(&mut self, world_point: Point<Real>) -> bool {
        self.release_grab();

        let (stiffness, damping) = match &self.pointer {
            Some(pointer) => (pointer.stiffness, pointer.damping),
            None => return false,
        };
        let Some(body_handle) = self.query_cookie_at_point(world_point) else {
            return false;
        };
        let Some(body) = self.rigid_body_set.get(body_handle) else {
            return false;
        };

        let local_anchor = body.position().inverse() * world_point;

        // Cursor body follows the pointer; it is moved, never simulated
        let cursor_body = RigidBodyBuilder::kinematic_position_based()
            .translation(world_point.coords)
            .build();
        let cursor_body_handle = self.rigid_body_set.insert(cursor_body);

        let joint = SpringJointBuilder::new(0.0, stiffness, damping)
            .spring_model(MotorModel::AccelerationBased)
            .local_anchor1(Point::origin())
            .local_anchor2(local_anchor)
            .build();
        let joint_handle = self
            .impulse_joint_set
            .insert(cursor_body_handle, body_handle, joint, true);

        if let Some(pointer) = self.pointer.as_mut() {
            pointer.grab = Some(GrabState {
                cursor_body_handle,
                joint_handle,
                grabbed_body_handle: body_handle,
                anchor_point: local_anchor,
            });
        }
        debug!(x = world_point.x, y = world_point.y, "pointer grabbed cookie");
        true
    }

    /// Move the cursor body to follow the pointer
    pub fn update_cursor(&mut self, world_point: Point<Real>) {
        let Some(grab_state) = self.pointer.as_ref().and_then(|pointer| pointer.grab.as_ref()) else {
            return;
        };
        if let Some(cursor_body) = self.rigid_body_set.get_mut(grab_state.cursor_body_handle) {
            cursor_body.set_next_kinematic_translation(world_point.coords);
        }
    }

    /// Drop the current grip
    pub fn release_grab(&mut self) {
        let Some(grab_state) = self.pointer.as_mut().and_then(|pointer| pointer.grab.take()) else {
            return;
        };
        self.impulse_joint_set.remove(grab_state.joint_handle, true);
        self.rigid_body_set.remove(
            grab_state.cursor_body_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn is_grabbing(&self) -> bool {
        self.grab_state().is_some()
    }

    pub fn grab_state(&self) -> Option<&GrabState> {
        self.pointer.as_ref().and_then(|pointer| pointer.grab.as_ref())
    }

    /// Where the held cookie is gripped, in viewport pixels.
    pub fn grip_point_px(&self) -> Option<[f32; 2]> {
        let grab_state = self.grab_state()?;
        let body = self.rigid_body_set.get(grab_state.grabbed_body_handle)?;
        let grip = body.position() * grab_state.anchor_point;
        Some([m_to_px(grip.x), m_to_px(grip.y)])
    }

    pub fn grabbed_body(&self) -> Option<BodyHandle> {
        self.grab_state()
            .map(|grab_state| self.handle_for(grab_state.grabbed_body_handle))
    }

    pub fn pointer(&self) -> Option<&PointerConstraint> {
        self.pointer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::physics::BodyParams;
    use crate::viewport::ViewportSize;
    use crate::world::BodySpec;

    fn world_with_cookie() -> (ShelfWorld, Rc<PointerSurface>, BodyHandle) {
        let surface = Rc::new(PointerSurface::new());
        let mut world =
            ShelfWorld::create(ViewportSize::new(800.0, 600.0), &surface, &PhysicsConfig::default()).unwrap();
        let handle = world
            .add_body(BodySpec {
                item_id: 1,
                label: "cookie-1".into(),
                radius_px: 50.0,
                position_px: [400.0, 300.0],
                rotation: 0.0,
                params: BodyParams::default(),
            })
            .unwrap();
        (world, surface, handle)
    }

    #[test]
    fn test_pointer_down_on_cookie_grabs_it() {
        let (mut world, surface, handle) = world_with_cookie();
        surface.dispatch(PointerEvent::Down { x: 410.0, y: 290.0 });
        assert_eq!(world.pump_pointer(), 1);
        assert!(world.is_grabbing());
        assert_eq!(world.grabbed_body(), Some(handle));
        // cookie body plus cursor body, on top of the three boundaries
        assert_eq!(world.rigid_body_count(), 5);
    }

    #[test]
    fn test_grip_point_tracks_grabbed_spot() {
        let (mut world, surface, handle) = world_with_cookie();
        assert_eq!(world.grip_point_px(), None);
        surface.dispatch(PointerEvent::Down { x: 420.0, y: 290.0 });
        world.pump_pointer();
        let [gx, gy] = world.grip_point_px().unwrap();
        assert!((gx - 420.0).abs() < 1e-3 && (gy - 290.0).abs() < 1e-3);

        for _ in 0..30 {
            world.step();
        }
        let [cx, cy] = world.body_snapshot(handle).unwrap().position_px();
        let [gx, gy] = world.grip_point_px().unwrap();
        assert!(((gx - cx).hypot(gy - cy) - 20.0f32.hypot(10.0)).abs() < 1e-2);
    }

    #[test]
    fn test_pointer_down_on_empty_space_grabs_nothing() {
        let (mut world, surface, _handle) = world_with_cookie();
        surface.dispatch(PointerEvent::Down { x: 50.0, y: 50.0 });
        world.pump_pointer();
        assert!(!world.is_grabbing());
        assert_eq!(world.rigid_body_count(), 4);
    }

    #[test]
    fn test_drag_pulls_cookie_toward_pointer() {
        let (mut world, surface, handle) = world_with_cookie();
        surface.dispatch(PointerEvent::Down { x: 400.0, y: 300.0 });
        world.pump_pointer();
        for _ in 0..60 {
            surface.dispatch(PointerEvent::Move { x: 200.0, y: 300.0 });
            world.pump_pointer();
            world.step();
        }
        let [x, _] = world.body_snapshot(handle).unwrap().position_px();
        assert!(x < 390.0, "cookie did not follow the pointer: {x}");
    }

    #[test]
    fn test_pointer_up_releases_grab() {
        let (mut world, surface, _handle) = world_with_cookie();
        surface.dispatch(PointerEvent::Down { x: 400.0, y: 300.0 });
        surface.dispatch(PointerEvent::Up);
        world.pump_pointer();
        assert!(!world.is_grabbing());
        assert_eq!(world.rigid_body_count(), 4);
    }

    #[test]
    fn test_static_cookies_cannot_be_grabbed() {
        let (mut world, surface, handle) = world_with_cookie();
        world.set_static(handle, true);
        surface.dispatch(PointerEvent::Down { x: 400.0, y: 300.0 });
        world.pump_pointer();
        assert!(!world.is_grabbing());
    }

    #[test]
    fn test_removing_grabbed_body_releases_grab() {
        let (mut world, surface, handle) = world_with_cookie();
        surface.dispatch(PointerEvent::Down { x: 400.0, y: 300.0 });
        world.pump_pointer();
        assert!(world.remove_body(handle));
        assert!(!world.is_grabbing());
        assert_eq!(world.rigid_body_count(), 3);
    }
}
