//! Easing functions for timed animations

/// Easing function applied to normalized progress (0.0 to 1.0)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant rate
    Linear,
    /// Accelerate from rest (cubic)
    EaseIn,
    /// Decelerate to rest (cubic)
    #[default]
    EaseOut,
    /// Accelerate then decelerate (cubic)
    EaseInOut,
}

impl Easing {
    /// Apply the easing curve to normalized progress
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}
