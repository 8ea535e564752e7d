/// Easing curves for overlay tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Overshoots past 1 before settling; the parameter is the overshoot amount.
    BackOut(f32),
    /// Pulls back below 0 before accelerating to 1.
    BackIn(f32),
}

impl Easing {
    /// Calculate easing value for time t (0.0 to 1.0)
    pub fn ease(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::BackIn(c1) => {
                let c3 = c1 + 1.0;
                c3 * t * t * t - c1 * t * t
            }
            Easing::BackOut(c1) => {
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}
