//! Animatable value types
//!
//! The [`Interpolate`] trait covers values that can be blended
//! linearly; [`Tween`] runs a single fixed-duration from→to segment
//! through an easing curve (the dissolve fade is one of these).

use pinfield_core::Color;

use crate::easing::Easing;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

/// A fixed-duration from→to animation over an interpolatable value
#[derive(Clone, Debug)]
pub struct Tween<T: Interpolate> {
    from: T,
    to: T,
    duration_ms: u32,
    easing: Easing,
    /// Elapsed time in milliseconds
    elapsed_ms: f32,
}

impl<T: Interpolate> Tween<T> {
    /// Create a tween from `from` to `to` over `duration_ms`
    pub fn new(from: T, to: T, duration_ms: u32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.elapsed_ms = (self.elapsed_ms + dt * 1000.0).min(self.duration_ms as f32);
    }

    /// Normalized progress (0.0 to 1.0, before easing)
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// Current eased value
    pub fn value(&self) -> T {
        self.from.lerp(&self.to, self.easing.apply(self.progress()))
    }

    /// Whether the tween has run to completion
    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms as f32
    }
}
