use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

// Simulation constants
pub const FIXED_TIME_STEP: Real = 1.0 / 60.0;
pub const MAX_SUBSTEPS: u32 = 4;
pub const PIXELS_PER_METER: f32 = 100.0;
pub const DEFAULT_GRAVITY: Real = 9.81;

// Collision groups
pub const GROUP_BOUNDARY: u32 = 0b0001;
pub const GROUP_COOKIE: u32 = 0b0010;

// Boundary geometry (pixels)
pub const BOUNDARY_THICKNESS_PX: f32 = 100.0;
pub const SHELF_THICKNESS_PX: f32 = 12.0;

// Cookie material, tuned to feel like the jar on the landing page
pub const COOKIE_RESTITUTION: Real = 0.5;
pub const COOKIE_FRICTION: Real = 0.1;
pub const COOKIE_DENSITY: Real = 0.04;

// Pointer spring
pub const POINTER_STIFFNESS: Real = 120.0;
pub const POINTER_DAMPING: Real = 12.0;

/// Material parameters for a cookie collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    pub restitution: Real,
    pub friction: Real,
    pub density: Real,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            restitution: COOKIE_RESTITUTION,
            friction: COOKIE_FRICTION,
            density: COOKIE_DENSITY,
        }
    }
}

/// Read-out of one body, in world units (meters, y down).
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub rotation: f32,
    pub angular_velocity: f32,
    pub is_static: bool,
}

impl BodySnapshot {
    pub fn position_px(&self) -> [f32; 2] {
        [m_to_px(self.position[0]), m_to_px(self.position[1])]
    }
}

pub fn px_to_m(px: f32) -> Real {
    px / PIXELS_PER_METER
}

pub fn m_to_px(m: Real) -> f32 {
    m * PIXELS_PER_METER
}
