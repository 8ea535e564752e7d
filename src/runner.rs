use rapier2d::prelude::Real;

use crate::world::ShelfWorld;

/// Longest frame the runner will try to catch up on.
const MAX_FRAME_TIME: Real = 0.25;

/// Fixed-timestep stepper: frame time is accumulated and spent in whole steps.
#[derive(Debug, Clone)]
pub struct Runner {
    fixed_dt: Real,
    max_substeps: u32,
    accumulator: Real,
    running: bool,
    steps: u64,
}

impl Runner {
    pub fn new(fixed_dt: Real, max_substeps: u32) -> Self {
        Self {
            fixed_dt,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            running: false,
            steps: 0,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halt stepping and forget any unspent frame time.
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance `world` by `frame_dt` seconds. Returns the number of steps taken.
    ///
    /// At most `max_substeps` steps run per frame; backlog beyond that is dropped
    /// rather than carried, so a stalled frame cannot snowball.
    pub fn advance(&mut self, world: &mut ShelfWorld, frame_dt: Real) -> u32 {
        if !self.running || world.is_destroyed() || !(frame_dt > 0.0) {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_TIME);
        let mut taken = 0;
        while self.accumulator >= self.fixed_dt && taken < self.max_substeps {
            world.step();
            self.accumulator -= self.fixed_dt;
            taken += 1;
        }
        if taken == self.max_substeps {
            self.accumulator = self.accumulator.min(self.fixed_dt);
        }
        self.steps += u64::from(taken);
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::input::PointerSurface;
    use crate::viewport::ViewportSize;
    use std::rc::Rc;

    fn world() -> ShelfWorld {
        let surface = Rc::new(PointerSurface::new());
        ShelfWorld::create(ViewportSize::new(800.0, 600.0), &surface, &PhysicsConfig::default()).unwrap()
    }

    #[test]
    fn test_stopped_runner_does_not_step() {
        let mut world = world();
        let mut runner = Runner::new(1.0 / 60.0, 4);
        assert_eq!(runner.advance(&mut world, 0.1), 0);
        assert_eq!(world.time(), 0.0);
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let mut world = world();
        let mut runner = Runner::new(0.01, 4);
        runner.start();
        assert_eq!(runner.advance(&mut world, 0.006), 0);
        assert_eq!(runner.advance(&mut world, 0.006), 1);
        assert_eq!(runner.advance(&mut world, 0.025), 2);
        assert_eq!(runner.steps(), 3);
    }

    #[test]
    fn test_caps_substeps_per_frame() {
        let mut world = world();
        let mut runner = Runner::new(0.01, 4);
        runner.start();
        assert_eq!(runner.advance(&mut world, 0.2), 4);
        // backlog was dropped
        assert!(runner.advance(&mut world, 0.0001) <= 1);
    }

    #[test]
    fn test_destroyed_world_is_not_stepped() {
        let mut world = world();
        let mut runner = Runner::new(0.01, 4);
        runner.start();
        world.destroy();
        assert_eq!(runner.advance(&mut world, 0.1), 0);
    }

    #[test]
    fn test_stop_halts_stepping() {
        let mut world = world();
        let mut runner = Runner::new(0.01, 4);
        runner.start();
        runner.stop();
        assert!(!runner.is_running());
        assert_eq!(runner.advance(&mut world, 0.1), 0);
    }
}
