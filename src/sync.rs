//! Per-frame read-out from bodies to on-screen elements.
//!
//! Each catalog item gets a [`SyncLoop`] pairing its body with its element. Every
//! tick a running loop reads the body and writes the projected transform. A loop
//! whose body or element has gone away stops quietly; the item simply freezes.
//! After a world rebuild, [`Synchronizer::retarget`] points a loop at the item's new
//! body and starts it again.

use tracing::debug;

use crate::render::{ElementId, ItemTransform, RenderSurface};
use crate::world::{BodyHandle, ShelfWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    BodyGone,
    ElementGone,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped(StopReason),
}

#[derive(Debug, Clone)]
pub struct SyncLoop {
    pub item_id: u32,
    pub element: ElementId,
    pub body: BodyHandle,
    pub radius_px: f32,
    pub state: LoopState,
    pub frames: u64,
}

impl SyncLoop {
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }
}

#[derive(Debug, Default)]
pub struct Synchronizer {
    loops: Vec<SyncLoop>,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the loop for `item_id`.
    pub fn start(&mut self, item_id: u32, element: ElementId, body: BodyHandle, radius_px: f32) {
        let sync_loop = SyncLoop {
            item_id,
            element,
            body,
            radius_px,
            state: LoopState::Running,
            frames: 0,
        };
        match self.loops.iter_mut().find(|l| l.item_id == item_id) {
            Some(existing) => *existing = sync_loop,
            None => self.loops.push(sync_loop),
        }
    }

    /// Point the loop for `item_id` at a replacement body and resume it.
    pub fn retarget(&mut self, item_id: u32, body: BodyHandle, radius_px: f32) -> bool {
        match self.loops.iter_mut().find(|l| l.item_id == item_id) {
            Some(sync_loop) => {
                sync_loop.body = body;
                sync_loop.radius_px = radius_px;
                sync_loop.state = LoopState::Running;
                true
            }
            None => false,
        }
    }

    /// Copy every running loop's body state onto its element. Returns the number written.
    pub fn tick(&mut self, world: &ShelfWorld, surface: &mut dyn RenderSurface) -> usize {
        let mut written = 0;
        for sync_loop in self.loops.iter_mut().filter(|l| l.is_running()) {
            let Some(snapshot) = world.body_snapshot(sync_loop.body) else {
                debug!(item = sync_loop.item_id, "sync loop stopped: body gone");
                sync_loop.state = LoopState::Stopped(StopReason::BodyGone);
                continue;
            };
            let transform = ItemTransform::project(&snapshot, sync_loop.radius_px);
            if surface.write_transform(sync_loop.element, transform).is_err() {
                debug!(item = sync_loop.item_id, "sync loop stopped: element gone");
                sync_loop.state = LoopState::Stopped(StopReason::ElementGone);
                continue;
            }
            sync_loop.frames += 1;
            written += 1;
        }
        written
    }

    pub fn cancel_all(&mut self) {
        for sync_loop in &mut self.loops {
            if sync_loop.is_running() {
                sync_loop.state = LoopState::Stopped(StopReason::Cancelled);
            }
        }
    }

    /// Cancel and forget every loop.
    pub fn clear(&mut self) {
        self.cancel_all();
        self.loops.clear();
    }

    pub fn active_count(&self) -> usize {
        self.loops.iter().filter(|l| l.is_running()).count()
    }

    pub fn get(&self, item_id: u32) -> Option<&SyncLoop> {
        self.loops.iter().find(|l| l.item_id == item_id)
    }

    pub fn loops(&self) -> &[SyncLoop] {
        &self.loops
    }
}
