//! Display mode controller.
//!
//! [`ShelfDisplay`] owns the shelf session: one [`ShelfWorld`], its [`Runner`] and
//! the shelves it was built with. Entering shelf mode builds the session and mounts
//! one element per catalog item; leaving it tears everything down. A resize is
//! debounced and then rebuilds the session from scratch at the new size, keeping the
//! mounted elements and retargeting their sync loops at the new bodies.
//!
//! Frame order is fixed: pointer events, then physics steps, then the read-out.

use std::fmt;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::catalog::CatalogItem;
use crate::config::{LayoutConfig, PhysicsConfig, StorefrontConfig};
use crate::input::PointerSurface;
use crate::render::{ElementId, RenderSurface};
use crate::runner::Runner;
use crate::shelf::{grid_layout, layout_shelves, organized_position, Shelf};
use crate::sync::Synchronizer;
use crate::viewport::{Breakpoint, ViewportSize};
use crate::world::{BodyHandle, BodySpec, ShelfWorld, WorldError};

/// Horizontal scatter kick range, m/s either way.
const SCATTER_SPREAD: f32 = 4.0;
/// Upward scatter kick range, m/s (negative is up).
const SCATTER_LIFT: std::ops::Range<f32> = -10.0..-6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Shelf,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInShelfMode,
    PhysicsDisabled,
    NoShelves,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NotInShelfMode => "shelf mode is not active",
            SkipReason::PhysicsDisabled => "physics is disabled",
            SkipReason::NoShelves => "there are no shelves",
        };
        f.write_str(reason)
    }
}

/// What a bulk command did. Skipped commands changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied(usize),
    Skipped(SkipReason),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub pointer_events: usize,
    pub steps: u32,
    pub synced: usize,
}

#[derive(Debug, Clone)]
struct DisplayItem {
    id: u32,
    name: String,
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    size: ViewportSize,
    quiet_for: f64,
}

#[derive(Debug)]
struct ShelfSession {
    world: ShelfWorld,
    runner: Runner,
    shelves: Vec<Shelf>,
}

impl ShelfSession {
    fn teardown(mut self) {
        self.runner.stop();
        self.world.destroy();
    }
}

pub struct ShelfDisplay {
    physics: PhysicsConfig,
    layout: LayoutConfig,
    items: Vec<DisplayItem>,
    surface: Rc<PointerSurface>,
    viewport: ViewportSize,
    mode: DisplayMode,
    physics_enabled: bool,
    session: Option<ShelfSession>,
    sync: Synchronizer,
    elements: Vec<(u32, ElementId)>,
    pending_resize: Option<PendingResize>,
    rebuilds: u64,
    rng: StdRng,
}

impl ShelfDisplay {
    pub fn new(
        config: &StorefrontConfig,
        items: &[CatalogItem],
        surface: Rc<PointerSurface>,
        viewport: ViewportSize,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            physics: config.physics.clone(),
            layout: config.layout.clone(),
            items: items
                .iter()
                .map(|item| DisplayItem {
                    id: item.id,
                    name: item.name.clone(),
                })
                .collect(),
            surface,
            viewport,
            mode: DisplayMode::Grid,
            physics_enabled: true,
            session: None,
            sync: Synchronizer::new(),
            elements: Vec::new(),
            pending_resize: None,
            rebuilds: 0,
            rng,
        }
    }

    /// Build the shelf world and start animating. A no-op when already active.
    pub fn enter_shelf_mode(&mut self, surface: &mut dyn RenderSurface) -> Result<(), WorldError> {
        if self.session.is_some() {
            debug!("shelf mode already active");
            return Ok(());
        }
        let session = self.build_session()?;
        self.mode = DisplayMode::Shelf;
        self.physics_enabled = true;
        self.attach_session(session, surface);
        info!(bodies = self.body_count(), "entered shelf mode");
        Ok(())
    }

    /// Tear the session down completely and unmount every item element.
    pub fn exit_shelf_mode(&mut self, surface: &mut dyn RenderSurface) {
        if self.mode == DisplayMode::Grid && self.session.is_none() && self.elements.is_empty() {
            return;
        }
        if let Some(session) = self.session.take() {
            session.teardown();
        }
        self.sync.clear();
        for (_, element) in self.elements.drain(..) {
            surface.unmount(element);
        }
        self.mode = DisplayMode::Grid;
        self.physics_enabled = true;
        self.pending_resize = None;
        info!("left shelf mode");
    }

    /// Record a new viewport size. Shelf mode rebuilds once the size stops changing.
    pub fn viewport_resized(&mut self, size: ViewportSize) {
        if self.mode == DisplayMode::Grid {
            self.viewport = size;
            return;
        }
        if self.pending_resize.is_none() && size == self.viewport && self.session.is_some() {
            return;
        }
        debug!(width = size.width, height = size.height, "resize pending");
        self.pending_resize = Some(PendingResize { size, quiet_for: 0.0 });
    }

    /// Advance one display frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32, surface: &mut dyn RenderSurface) -> FrameStats {
        self.settle_resize(f64::from(dt), surface);
        let Some(session) = self.session.as_mut() else {
            return FrameStats::default();
        };
        let pointer_events = session.world.pump_pointer();
        let steps = session.runner.advance(&mut session.world, dt);
        let synced = self.sync.tick(&session.world, surface);
        FrameStats {
            pointer_events,
            steps,
            synced,
        }
    }

    fn settle_resize(&mut self, dt: f64, surface: &mut dyn RenderSurface) {
        let Some(pending) = self.pending_resize.as_mut() else {
            return;
        };
        pending.quiet_for += dt;
        if pending.quiet_for < self.layout.resize_debounce_secs {
            return;
        }
        let size = pending.size;
        self.pending_resize = None;
        self.viewport = size;
        self.rebuild(surface);
    }

    fn rebuild(&mut self, surface: &mut dyn RenderSurface) {
        if let Some(session) = self.session.take() {
            session.teardown();
        }
        self.rebuilds += 1;
        match self.build_session() {
            Ok(session) => {
                self.attach_session(session, surface);
                if !self.physics_enabled {
                    self.set_all_static(true);
                    self.self_organize();
                }
                info!(
                    width = self.viewport.width,
                    height = self.viewport.height,
                    "shelf world rebuilt"
                );
            }
            Err(err) => {
                warn!(%err, "shelf rebuild failed, items frozen until the next resize");
                self.sync.cancel_all();
            }
        }
    }

    fn build_session(&mut self) -> Result<ShelfSession, WorldError> {
        let mut world = ShelfWorld::create(self.viewport, &self.surface, &self.physics)?;
        let shelves = layout_shelves(self.viewport, self.breakpoint());
        for shelf in &shelves {
            world.add_shelf(shelf);
        }
        let radius = self.item_radius();
        for item in &self.items {
            let spec = BodySpec::spawn(
                item.id,
                item.name.clone(),
                radius,
                self.physics.cookie,
                self.viewport,
                self.layout.spawn_band,
                &mut self.rng,
            );
            world.add_body(spec);
        }
        let mut runner = Runner::new(self.physics.fixed_timestep, self.physics.max_substeps);
        runner.start();
        Ok(ShelfSession {
            world,
            runner,
            shelves,
        })
    }

    fn attach_session(&mut self, session: ShelfSession, surface: &mut dyn RenderSurface) {
        for cookie in session.world.cookies() {
            let mounted = self
                .elements
                .iter()
                .find(|(item_id, _)| *item_id == cookie.item_id)
                .map(|(_, element)| *element);
            match mounted {
                Some(element) => {
                    if !self.sync.retarget(cookie.item_id, cookie.handle, cookie.radius_px) {
                        self.sync
                            .start(cookie.item_id, element, cookie.handle, cookie.radius_px);
                    }
                }
                None => {
                    let element = surface.mount(&cookie.label);
                    self.elements.push((cookie.item_id, element));
                    self.sync
                        .start(cookie.item_id, element, cookie.handle, cookie.radius_px);
                }
            }
        }
        self.session = Some(session);
    }

    fn cookie_handles(&self) -> Vec<BodyHandle> {
        self.session
            .as_ref()
            .map(|session| session.world.cookies().iter().map(|c| c.handle).collect())
            .unwrap_or_default()
    }

    fn set_all_static(&mut self, is_static: bool) -> usize {
        let handles = self.cookie_handles();
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        if is_static {
            session.world.release_grab();
        }
        handles
            .into_iter()
            .filter(|handle| session.world.set_static(*handle, is_static))
            .count()
    }

    /// Freeze every cookie in place and organize them, or let them fall again.
    pub fn toggle_physics(&mut self, enabled: bool) -> CommandOutcome {
        if self.session.is_none() {
            return CommandOutcome::Skipped(SkipReason::NotInShelfMode);
        }
        self.physics_enabled = enabled;
        let changed = self.set_all_static(!enabled);
        info!(enabled, bodies = changed, "physics toggled");
        if !enabled {
            self.self_organize();
        }
        CommandOutcome::Applied(changed)
    }

    /// Kick every moving cookie upward with a random sideways component.
    pub fn scatter(&mut self) -> CommandOutcome {
        if self.session.is_none() {
            return CommandOutcome::Skipped(SkipReason::NotInShelfMode);
        }
        if !self.physics_enabled {
            debug!("scatter skipped: physics disabled");
            return CommandOutcome::Skipped(SkipReason::PhysicsDisabled);
        }
        let handles = self.cookie_handles();
        let Some(session) = self.session.as_mut() else {
            return CommandOutcome::Skipped(SkipReason::NotInShelfMode);
        };
        let mut kicked = 0;
        for handle in handles {
            let is_static = session
                .world
                .body_snapshot(handle)
                .map_or(true, |snapshot| snapshot.is_static);
            if is_static {
                continue;
            }
            let kick = [
                self.rng.gen_range(-SCATTER_SPREAD..SCATTER_SPREAD),
                self.rng.gen_range(SCATTER_LIFT),
            ];
            if session.world.add_velocity(handle, kick) {
                kicked += 1;
            }
        }
        debug!(kicked, "scattered");
        CommandOutcome::Applied(kicked)
    }

    /// Place every cookie just above a shelf, round-robin by index, at rest.
    pub fn self_organize(&mut self) -> CommandOutcome {
        let Some(session) = self.session.as_mut() else {
            return CommandOutcome::Skipped(SkipReason::NotInShelfMode);
        };
        if session.shelves.is_empty() {
            warn!("self-organize skipped: no shelves");
            return CommandOutcome::Skipped(SkipReason::NoShelves);
        }
        let placements: Vec<(BodyHandle, f32)> = session
            .world
            .cookies()
            .iter()
            .map(|cookie| (cookie.handle, cookie.radius_px))
            .collect();
        let count = placements.len();
        let mut moved = 0;
        for (index, (handle, radius)) in placements.into_iter().enumerate() {
            let Some(position) = organized_position(&session.shelves, index, count, radius) else {
                continue;
            };
            if session.world.set_position_px(handle, position) {
                session.world.set_velocity(handle, [0.0, 0.0], 0.0);
                moved += 1;
            }
        }
        debug!(moved, shelves = session.shelves.len(), "self-organized");
        CommandOutcome::Applied(moved)
    }

    /// Catalog id of the item drawn at viewport point (`x`, `y`), in either mode.
    pub fn item_at(&self, x: f32, y: f32) -> Option<u32> {
        match &self.session {
            Some(session) => session.world.cookie_at_px(x, y).map(|cookie| cookie.item_id),
            None => {
                let radius = self.item_radius();
                self.grid_layout()
                    .into_iter()
                    .find(|(_, [cx, cy])| (cx - x).hypot(cy - y) <= radius)
                    .map(|(id, _)| id)
            }
        }
    }

    /// Static grid placement of every item, for grid mode.
    pub fn grid_layout(&self) -> Vec<(u32, [f32; 2])> {
        let cells = grid_layout(self.viewport, self.breakpoint(), self.items.len());
        self.items.iter().map(|item| item.id).zip(cells).collect()
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.viewport.breakpoint(self.layout.mobile_breakpoint)
    }

    pub fn item_radius(&self) -> f32 {
        self.layout.cookie_radius(self.breakpoint())
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// True while a live world exists.
    pub fn is_shelf_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn physics_enabled(&self) -> bool {
        self.physics_enabled
    }

    pub fn body_count(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.world.body_count())
    }

    pub fn active_sync_loops(&self) -> usize {
        self.sync.active_count()
    }

    pub fn shelves(&self) -> &[Shelf] {
        self.session.as_ref().map_or(&[], |session| &session.shelves)
    }

    pub fn world(&self) -> Option<&ShelfWorld> {
        self.session.as_ref().map(|session| &session.world)
    }

    pub fn element_for(&self, item_id: u32) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(id, _)| *id == item_id)
            .map(|(_, element)| *element)
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

impl Drop for ShelfDisplay {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown();
        }
    }
}

impl fmt::Debug for ShelfDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShelfDisplay")
            .field("mode", &self.mode)
            .field("viewport", &self.viewport)
            .field("physics_enabled", &self.physics_enabled)
            .field("bodies", &self.body_count())
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::input::PointerEvent;
    use crate::render::{ElementTable, ItemTransform};

    const FRAME: f32 = 1.0 / 60.0;

    fn items(count: u32) -> Vec<CatalogItem> {
        (1..=count)
            .map(|id| CatalogItem {
                id,
                name: format!("Cookie {id}"),
                category: "classic".to_string(),
                price_cents: 300 + id * 10,
                rating: 4.5,
                image: format!("https://example.invalid/{id}.png"),
                description: String::new(),
            })
            .collect()
    }

    fn display(items: &[CatalogItem], viewport: ViewportSize) -> (ShelfDisplay, Rc<PointerSurface>) {
        let config = StorefrontConfig {
            seed: Some(7),
            ..StorefrontConfig::default()
        };
        let surface = Rc::new(PointerSurface::new());
        (ShelfDisplay::new(&config, items, Rc::clone(&surface), viewport), surface)
    }

    fn desktop() -> ViewportSize {
        ViewportSize::new(1200.0, 800.0)
    }

    fn run(display: &mut ShelfDisplay, table: &mut ElementTable, frames: usize) {
        for _ in 0..frames {
            display.frame(FRAME, table);
        }
    }

    #[test]
    fn test_enter_spawns_one_body_per_item_once() {
        let catalog = Catalog::builtin().unwrap();
        let (mut display, _) = display(catalog.items(), desktop());
        let mut table = ElementTable::new();

        display.enter_shelf_mode(&mut table).unwrap();
        let world_id = display.world().unwrap().id();
        assert_eq!(display.body_count(), catalog.len());
        assert_eq!(table.len(), catalog.len());
        assert_eq!(display.active_sync_loops(), catalog.len());

        display.enter_shelf_mode(&mut table).unwrap();
        assert_eq!(display.body_count(), catalog.len());
        assert_eq!(table.len(), catalog.len());
        assert_eq!(display.world().unwrap().id(), world_id);
        assert_eq!(display.mode(), DisplayMode::Shelf);
    }

    #[test]
    fn test_exit_leaves_nothing_behind() {
        let (mut display, pointer) = display(&items(5), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        run(&mut display, &mut table, 10);
        assert_eq!(pointer.listener_count(), 1);

        display.exit_shelf_mode(&mut table);
        assert_eq!(display.body_count(), 0);
        assert_eq!(display.active_sync_loops(), 0);
        assert!(table.is_empty());
        assert!(display.world().is_none());
        assert_eq!(pointer.listener_count(), 0);
        assert_eq!(display.mode(), DisplayMode::Grid);

        display.exit_shelf_mode(&mut table);
        display.enter_shelf_mode(&mut table).unwrap();
        assert_eq!(display.body_count(), 5);
        assert_eq!(pointer.listener_count(), 1);
    }

    #[test]
    fn test_frame_writes_projection_of_stepped_bodies() {
        let (mut display, _) = display(&items(3), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();

        let stats = display.frame(FRAME, &mut table);
        assert_eq!(stats.steps, 1);
        assert_eq!(stats.synced, 3);

        let world = display.world().unwrap();
        for cookie in world.cookies() {
            let element = display.element_for(cookie.item_id).unwrap();
            let snapshot = world.body_snapshot(cookie.handle).unwrap();
            assert_eq!(
                table.transform(element),
                Some(ItemTransform::project(&snapshot, cookie.radius_px))
            );
        }
    }

    #[test]
    fn test_toggle_physics_off_and_on() {
        let (mut display, _) = display(&items(6), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        run(&mut display, &mut table, 30);

        assert_eq!(display.toggle_physics(false), CommandOutcome::Applied(6));
        assert!(!display.physics_enabled());
        let world = display.world().unwrap();
        for cookie in world.cookies() {
            let snapshot = world.body_snapshot(cookie.handle).unwrap();
            assert!(snapshot.is_static);
            assert_eq!(snapshot.velocity, [0.0, 0.0]);
            assert_eq!(snapshot.angular_velocity, 0.0);
        }

        assert_eq!(display.toggle_physics(true), CommandOutcome::Applied(6));
        let world = display.world().unwrap();
        for cookie in world.cookies() {
            let snapshot = world.body_snapshot(cookie.handle).unwrap();
            assert!(!snapshot.is_static);
            assert_eq!(snapshot.velocity, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_disabled_physics_freezes_organized_positions() {
        let (mut display, _) = display(&items(6), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        display.toggle_physics(false);

        let before: Vec<[f32; 2]> = display
            .world()
            .unwrap()
            .cookies()
            .iter()
            .map(|c| display.world().unwrap().body_snapshot(c.handle).unwrap().position_px())
            .collect();
        run(&mut display, &mut table, 60);
        let world = display.world().unwrap();
        for (cookie, expected) in world.cookies().iter().zip(before) {
            let [x, y] = world.body_snapshot(cookie.handle).unwrap().position_px();
            assert!((x - expected[0]).abs() < 1e-3 && (y - expected[1]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_self_organize_round_robin_across_three_shelves() {
        let (mut display, _) = display(&items(6), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        assert_eq!(display.shelves().len(), 3);

        assert_eq!(display.self_organize(), CommandOutcome::Applied(6));

        let shelves = display.shelves().to_vec();
        let world = display.world().unwrap();
        let mut per_shelf = [0; 3];
        for (index, cookie) in world.cookies().iter().enumerate() {
            let snapshot = world.body_snapshot(cookie.handle).unwrap();
            let [x, y] = snapshot.position_px();
            let shelf = &shelves[index % 3];
            assert!(shelf.spans(x), "cookie {index} at x={x} misses its shelf");
            assert!(y < shelf.top() && y > shelf.top() - 2.0 * cookie.radius_px);
            assert_eq!(snapshot.velocity, [0.0, 0.0]);
            per_shelf[index % 3] += 1;
        }
        assert_eq!(per_shelf, [2, 2, 2]);
    }

    #[test]
    fn test_commands_outside_shelf_mode_are_skipped() {
        let (mut display, _) = display(&items(4), desktop());
        assert_eq!(
            display.self_organize(),
            CommandOutcome::Skipped(SkipReason::NotInShelfMode)
        );
        assert_eq!(
            display.scatter(),
            CommandOutcome::Skipped(SkipReason::NotInShelfMode)
        );
        assert_eq!(
            display.toggle_physics(false),
            CommandOutcome::Skipped(SkipReason::NotInShelfMode)
        );
    }

    #[test]
    fn test_scatter_only_when_physics_enabled() {
        let (mut display, _) = display(&items(4), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        display.toggle_physics(false);

        assert_eq!(
            display.scatter(),
            CommandOutcome::Skipped(SkipReason::PhysicsDisabled)
        );
        let world = display.world().unwrap();
        for cookie in world.cookies() {
            assert_eq!(world.body_snapshot(cookie.handle).unwrap().velocity, [0.0, 0.0]);
        }

        display.toggle_physics(true);
        assert_eq!(display.scatter(), CommandOutcome::Applied(4));
        let world = display.world().unwrap();
        for cookie in world.cookies() {
            let snapshot = world.body_snapshot(cookie.handle).unwrap();
            assert!(snapshot.velocity[1] < 0.0, "scatter should lift every cookie");
        }
    }

    #[test]
    fn test_resize_is_debounced_into_one_rebuild() {
        let (mut display, pointer) = display(&items(5), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        let first = display.world().unwrap().id();

        for width in [1100.0, 1000.0, 900.0, 850.0] {
            display.viewport_resized(ViewportSize::new(width, 700.0));
            run(&mut display, &mut table, 3);
        }
        assert_eq!(display.rebuild_count(), 0);
        assert_eq!(display.world().unwrap().id(), first);

        run(&mut display, &mut table, 30);
        assert_eq!(display.rebuild_count(), 1);
        assert_ne!(display.world().unwrap().id(), first);
        assert_eq!(display.viewport(), ViewportSize::new(850.0, 700.0));
        assert_eq!(display.body_count(), 5);
        assert_eq!(table.len(), 5, "elements survive a rebuild");
        assert_eq!(display.active_sync_loops(), 5);
        assert_eq!(pointer.listener_count(), 1);
    }

    #[test]
    fn test_resize_drops_drag_and_keeps_disabled_physics() {
        let (mut display, pointer) = display(&items(3), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();
        run(&mut display, &mut table, 120);

        let world = display.world().unwrap();
        let [x, y] = world.body_snapshot(world.cookies()[0].handle).unwrap().position_px();
        pointer.dispatch(PointerEvent::Down { x, y });
        display.frame(FRAME, &mut table);
        assert!(display.world().unwrap().is_grabbing());

        display.viewport_resized(ViewportSize::new(1000.0, 700.0));
        run(&mut display, &mut table, 30);
        assert_eq!(display.rebuild_count(), 1);
        assert!(!display.world().unwrap().is_grabbing());

        display.toggle_physics(false);
        display.viewport_resized(ViewportSize::new(900.0, 700.0));
        run(&mut display, &mut table, 30);
        assert_eq!(display.rebuild_count(), 2);
        assert!(!display.physics_enabled());
        let world = display.world().unwrap();
        for cookie in world.cookies() {
            assert!(world.body_snapshot(cookie.handle).unwrap().is_static);
        }
    }

    #[test]
    fn test_zero_viewport_fails_cleanly() {
        let (mut display, pointer) = display(&items(3), ViewportSize::new(0.0, 0.0));
        let mut table = ElementTable::new();
        assert_eq!(
            display.enter_shelf_mode(&mut table),
            Err(WorldError::DegenerateViewport { width: 0.0, height: 0.0 })
        );
        assert_eq!(display.body_count(), 0);
        assert!(table.is_empty());
        assert_eq!(pointer.listener_count(), 0);
        assert_eq!(display.mode(), DisplayMode::Grid);
    }

    #[test]
    fn test_resize_to_zero_freezes_then_recovers() {
        let (mut display, _) = display(&items(3), desktop());
        let mut table = ElementTable::new();
        display.enter_shelf_mode(&mut table).unwrap();

        display.viewport_resized(ViewportSize::new(0.0, 0.0));
        run(&mut display, &mut table, 30);
        assert!(!display.is_shelf_active());
        assert_eq!(display.mode(), DisplayMode::Shelf);
        assert_eq!(display.active_sync_loops(), 0);
        assert_eq!(table.len(), 3);
        assert_eq!(display.self_organize(), CommandOutcome::Skipped(SkipReason::NotInShelfMode));

        display.viewport_resized(desktop());
        run(&mut display, &mut table, 30);
        assert!(display.is_shelf_active());
        assert_eq!(display.active_sync_loops(), 3);
    }

    #[test]
    fn test_item_at_in_grid_mode() {
        let (display, _) = display(&items(4), desktop());
        let (id, [x, y]) = display.grid_layout()[2];
        assert_eq!(display.item_at(x, y), Some(id));
        assert_eq!(display.item_at(-50.0, -50.0), None);
    }
}
