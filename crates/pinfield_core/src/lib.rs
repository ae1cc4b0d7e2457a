//! Pinfield Core
//!
//! Foundational primitives for the pinfield widget library:
//!
//! - **Geometry**: plain 2D point/size/rect value types
//! - **Color**: linear-space RGBA with interpolation
//! - **Events**: normalized input events and per-target dispatch
//! - **State Machines**: flat transition tables for interaction states
//!
//! # Example
//!
//! ```rust
//! use pinfield_core::fsm::StateMachine;
//! use pinfield_core::events::event_types;
//!
//! const IDLE: u32 = 0;
//! const FOCUSED: u32 = 1;
//!
//! let mut fsm = StateMachine::builder(IDLE)
//!     .on(IDLE, event_types::FOCUS, FOCUSED)
//!     .on(FOCUSED, event_types::BLUR, IDLE)
//!     .build();
//!
//! fsm.send(event_types::FOCUS);
//! assert_eq!(fsm.current_state(), FOCUSED);
//! ```

pub mod color;
pub mod events;
pub mod fsm;
pub mod geometry;

pub use color::Color;
pub use events::{Event, EventData, EventDispatcher, EventType, KeyCode, Modifiers};
pub use fsm::{EventId, StateId, StateMachine, StateMachineBuilder, Transition};
pub use geometry::{Point, Rect, Size};
