use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::px_to_m;

pub const DEFAULT_MOBILE_BREAKPOINT: f32 = 768.0;

/// Size of the host viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Mobile,
    Desktop,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport that cannot hold a world: zero, negative or non-finite extents.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn breakpoint(&self, mobile_breakpoint: f32) -> Breakpoint {
        if self.width < mobile_breakpoint {
            Breakpoint::Mobile
        } else {
            Breakpoint::Desktop
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.width && y <= self.height
    }
}

/// Convert viewport pixel coordinates to world coordinates.
///
/// The world shares the viewport's origin (top-left) and orientation (y down),
/// so this is a pure scale.
pub fn screen_to_world(screen_x: f32, screen_y: f32) -> Point<Real> {
    point![px_to_m(screen_x), px_to_m(screen_y)]
}
