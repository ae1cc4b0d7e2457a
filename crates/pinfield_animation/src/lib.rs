//! Pinfield Animation
//!
//! Animation primitives for the pinfield widget library:
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Easing**: curves for timed animations
//! - **Tweens**: single-segment fixed-duration animations over
//!   interpolatable values
//!
//! Animations here are passive values: the embedder steps them each
//! frame with a delta time, and logical widget state never waits on
//! them.

pub mod easing;
pub mod spring;
pub mod values;

pub use easing::Easing;
pub use spring::{Spring, SpringConfig};
pub use values::{Interpolate, Tween};
