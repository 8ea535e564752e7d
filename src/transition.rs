//! Page-transition gate.
//!
//! One transition at a time: `Idle -> Covering -> Revealing -> Idle`. Covering
//! grows a grid of tiles from the center outward until the page is hidden, then
//! navigates. Revealing shrinks them from the edges inward. Requests made while a
//! transition is in flight, or for the route already showing, are ignored.

use tracing::{debug, info};

use crate::config::TransitionConfig;
use crate::easing::Easing;
use crate::routes::Router;

/// Number of blob outlines tiles cycle through.
pub const TILE_SHAPES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerFrom {
    Center,
    Edges,
}

/// Per-tile start delays for a `rows x cols` grid, spread over `amount` seconds.
pub fn stagger_delays(rows: usize, cols: usize, from: StaggerFrom, amount: f32) -> Vec<f32> {
    let distances: Vec<f32> = (0..rows * cols)
        .map(|i| {
            let (row, col) = ((i / cols) as f32, (i % cols) as f32);
            let (last_row, last_col) = (rows as f32 - 1.0, cols as f32 - 1.0);
            match from {
                StaggerFrom::Center => (row - last_row / 2.0).hypot(col - last_col / 2.0),
                StaggerFrom::Edges => row.min(last_row - row).min(col).min(last_col - col),
            }
        })
        .collect();
    let max = distances.iter().copied().fold(0.0f32, f32::max);
    distances
        .into_iter()
        .map(|d| if max > 0.0 { amount * d / max } else { 0.0 })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTile {
    pub scale: f32,
    pub opacity: f32,
    pub shape: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Covering { target: String, elapsed: f32 },
    Revealing { elapsed: f32 },
}

#[derive(Debug, Clone)]
pub struct PageTransition {
    config: TransitionConfig,
    phase: Phase,
    cover_delays: Vec<f32>,
    reveal_delays: Vec<f32>,
    tiles: Vec<TransitionTile>,
    navigations: u64,
}

impl PageTransition {
    pub fn new(config: TransitionConfig) -> Self {
        let cover_delays = stagger_delays(config.rows, config.cols, StaggerFrom::Center, config.cover_stagger);
        let reveal_delays = stagger_delays(config.rows, config.cols, StaggerFrom::Edges, config.reveal_stagger);
        let tiles = (0..config.rows * config.cols)
            .map(|i| TransitionTile {
                scale: 0.0,
                opacity: 0.0,
                shape: i % TILE_SHAPES,
            })
            .collect();
        Self {
            config,
            phase: Phase::Idle,
            cover_delays,
            reveal_delays,
            tiles,
            navigations: 0,
        }
    }

    /// Start a transition to `target`. Returns false when the request is ignored.
    pub fn request_transition(&mut self, target: &str, router: &dyn Router) -> bool {
        if self.is_animating() {
            debug!(route = target, "transition already in flight, ignoring");
            return false;
        }
        if router.current() == target {
            debug!(route = target, "already on route, ignoring");
            return false;
        }
        info!(from = router.current(), to = target, "page transition started");
        self.phase = Phase::Covering {
            target: target.to_string(),
            elapsed: 0.0,
        };
        true
    }

    /// Advance the overlay by `dt` seconds, navigating once the page is covered.
    pub fn tick(&mut self, dt: f32, router: &mut dyn Router) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Covering { target, elapsed } => {
                let elapsed = elapsed + dt;
                let cover = self.cover_duration();
                if elapsed >= cover {
                    self.apply_cover(cover);
                    router.navigate(&target);
                    self.navigations += 1;
                    let overshoot = elapsed - cover;
                    self.apply_reveal(overshoot);
                    self.phase = Phase::Revealing { elapsed: overshoot };
                } else {
                    self.apply_cover(elapsed);
                    self.phase = Phase::Covering { target, elapsed };
                }
            }
            Phase::Revealing { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.reveal_duration() {
                    self.reset_tiles();
                    debug!("page transition finished");
                } else {
                    self.apply_reveal(elapsed);
                    self.phase = Phase::Revealing { elapsed };
                }
            }
        }
    }

    fn apply_cover(&mut self, elapsed: f32) {
        let ease = Easing::BackOut(self.config.overshoot);
        for (tile, delay) in self.tiles.iter_mut().zip(&self.cover_delays) {
            let progress = ease.ease(local_progress(elapsed, *delay, self.config.tile_duration));
            tile.scale = self.config.cover_scale * progress;
            tile.opacity = progress.clamp(0.0, 1.0);
        }
    }

    fn apply_reveal(&mut self, elapsed: f32) {
        let ease = Easing::BackIn(self.config.overshoot);
        let elapsed = elapsed - self.config.reveal_delay;
        for (tile, delay) in self.tiles.iter_mut().zip(&self.reveal_delays) {
            let progress = ease.ease(local_progress(elapsed, *delay, self.config.tile_duration));
            tile.scale = self.config.cover_scale * (1.0 - progress);
            tile.opacity = (1.0 - progress).clamp(0.0, 1.0);
        }
    }

    fn reset_tiles(&mut self) {
        for tile in &mut self.tiles {
            tile.scale = 0.0;
            tile.opacity = 0.0;
        }
    }

    /// Time from request until navigation.
    pub fn cover_duration(&self) -> f32 {
        max_delay(&self.cover_delays) + self.config.tile_duration
    }

    /// Time from navigation until the gate is idle again.
    pub fn reveal_duration(&self) -> f32 {
        self.config.reveal_delay + max_delay(&self.reveal_delays) + self.config.tile_duration
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn target(&self) -> Option<&str> {
        match &self.phase {
            Phase::Covering { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn tiles(&self) -> &[TransitionTile] {
        &self.tiles
    }

    pub fn grid(&self) -> (usize, usize) {
        (self.config.rows, self.config.cols)
    }

    pub fn navigations(&self) -> u64 {
        self.navigations
    }
}

fn local_progress(elapsed: f32, delay: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return if elapsed >= delay { 1.0 } else { 0.0 };
    }
    ((elapsed - delay) / duration).clamp(0.0, 1.0)
}

fn max_delay(delays: &[f32]) -> f32 {
    delays.iter().copied().fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{HistoryRouter, ABOUT, HOME, SHOP};

    const FRAME: f32 = 1.0 / 60.0;

    fn gate() -> PageTransition {
        PageTransition::new(TransitionConfig::default())
    }

    fn run_to_idle(gate: &mut PageTransition, router: &mut HistoryRouter) -> usize {
        let mut frames = 0;
        while gate.is_animating() {
            gate.tick(FRAME, router);
            frames += 1;
            assert!(frames < 10_000, "transition never finished");
        }
        frames
    }

    #[test]
    fn test_center_stagger_starts_in_the_middle() {
        let delays = stagger_delays(5, 8, StaggerFrom::Center, 0.4);
        let center = delays[2 * 8 + 3];
        let corner = delays[0];
        assert!(center < corner);
        assert!((corner - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_edge_stagger_starts_at_the_border() {
        let delays = stagger_delays(5, 8, StaggerFrom::Edges, 0.3);
        assert_eq!(delays[0], 0.0);
        assert_eq!(delays[7], 0.0);
        assert!(delays[2 * 8 + 3] > 0.0);
        assert!((max_delay(&delays) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_transition_to_current_route_is_noop() {
        let mut gate = gate();
        let mut router = HistoryRouter::new(HOME);
        assert!(!gate.request_transition(HOME, &router));
        assert!(!gate.is_animating());
        gate.tick(1.0, &mut router);
        assert_eq!(router.navigation_count(), 0);
    }

    #[test]
    fn test_second_request_in_flight_is_ignored() {
        let mut gate = gate();
        let mut router = HistoryRouter::new(HOME);
        assert!(gate.request_transition(SHOP, &router));
        gate.tick(FRAME, &mut router);
        assert!(!gate.request_transition(ABOUT, &router));
        assert!(!gate.request_transition(SHOP, &router));

        run_to_idle(&mut gate, &mut router);
        assert_eq!(router.history(), &[HOME.to_string(), SHOP.to_string()]);
        assert_eq!(gate.navigations(), 1);
    }

    #[test]
    fn test_navigation_waits_for_cover() {
        let mut gate = gate();
        let mut router = HistoryRouter::new(HOME);
        gate.request_transition(SHOP, &router);

        let cover = gate.cover_duration();
        let mut elapsed = 0.0;
        while elapsed + FRAME < cover {
            gate.tick(FRAME, &mut router);
            elapsed += FRAME;
            assert_eq!(router.current(), HOME);
        }
        gate.tick(FRAME, &mut router);
        assert_eq!(router.current(), SHOP);
        assert!(gate.is_animating(), "reveal still has to play");
        assert!(gate.tiles().iter().all(|t| (t.scale - 1.5).abs() < 1e-4));
    }

    #[test]
    fn test_long_cover_frame_carries_into_reveal() {
        let mut gate = gate();
        let mut router = HistoryRouter::new(HOME);
        gate.request_transition(SHOP, &router);

        let cover = gate.cover_duration();
        gate.tick(cover + 0.5, &mut router);
        assert_eq!(router.current(), SHOP);
        match gate.phase() {
            Phase::Revealing { elapsed } => assert!((elapsed - 0.5).abs() < 1e-4),
            phase => panic!("expected reveal, got {phase:?}"),
        }

        gate.tick(gate.reveal_duration(), &mut router);
        assert!(!gate.is_animating());
    }

    #[test]
    fn test_reveal_clears_tiles_and_goes_idle() {
        let mut gate = gate();
        let mut router = HistoryRouter::new(HOME);
        gate.request_transition(ABOUT, &router);
        let frames = run_to_idle(&mut gate, &mut router);

        let expected = (gate.cover_duration() + gate.reveal_duration()) / FRAME;
        assert!((frames as f32 - expected).abs() <= 3.0);
        assert_eq!(*gate.phase(), Phase::Idle);
        assert!(gate.tiles().iter().all(|t| t.scale == 0.0 && t.opacity == 0.0));
        assert!(gate.request_transition(HOME, &router));
    }

    #[test]
    fn test_tiles_cycle_shapes() {
        let gate = gate();
        assert_eq!(gate.tiles().len(), 40);
        assert_eq!(gate.tiles()[5].shape, 1);
        assert_eq!(gate.grid(), (5, 8));
    }
}
