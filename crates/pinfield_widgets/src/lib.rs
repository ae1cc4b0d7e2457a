//! Pinfield widget library
//!
//! Widgets are thin handles over state stored in a [`WidgetContext`]:
//! creating a widget registers an id, an interaction state machine,
//! and a typed state blob; events, animation steps, and layout passes
//! all go through the context.
//!
//! The flagship widget is [`DigitSlotInput`], a segmented digit-entry
//! control (PIN and one-time-code style): a row of underlined character
//! cells mirroring a hidden proxy input, with whole-string edit
//! validation and per-character reveal animation.
//!
//! # Example
//!
//! ```
//! use pinfield_widgets::prelude::*;
//!
//! let mut ctx = WidgetContext::new();
//! let mut input = digit_slot_input()
//!     .num_digits(6)
//!     .animation(EntryAnimation::Spring)
//!     .on_change(|value| println!("code so far: {value}"))
//!     .build(&mut ctx);
//!
//! input.focus(&mut ctx);
//! input.layout(&mut ctx, Size::new(320.0, 48.0));
//! input.handle_event(&mut ctx, &Event::text_input("4"));
//! assert_eq!(input.text(&ctx), "4");
//! ```

pub mod context;
pub mod digit_slot;
pub mod slot_layout;
pub mod widget;

pub use context::{DirtyTracker, WidgetContext, WidgetState};
pub use digit_slot::{
    digit_slot_input, AcceptedCharacters, ContentTypeHint, DigitSlotConfig, DigitSlotInput,
    DigitSlotInputBuilder, DigitSlotState, EntryAnimation, KeyboardAppearance, KeyboardOptions,
    KeyboardType, ProxyInput, RejectedEdit, Slot,
};
pub use slot_layout::{SlotGeometry, DEFAULT_SPACING, UNDERLINE_HEIGHT};
pub use widget::{Widget, WidgetId};

/// Commonly used types for building and driving widgets
pub mod prelude {
    pub use crate::context::WidgetContext;
    pub use crate::digit_slot::{
        digit_slot_input, AcceptedCharacters, DigitSlotConfig, DigitSlotInput, EntryAnimation,
        KeyboardOptions, RejectedEdit,
    };
    pub use crate::slot_layout::SlotGeometry;
    pub use crate::widget::{Widget, WidgetId};
    pub use pinfield_core::events::{Event, EventData, KeyCode, Modifiers};
    pub use pinfield_core::{Color, Point, Rect, Size};
}
