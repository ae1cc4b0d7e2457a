//! Unified event model and dispatch
//!
//! Platform input is normalized into [`Event`] values: a numeric event
//! type (used to drive widget state machines), an opaque target id, and
//! a typed payload. The [`EventDispatcher`] routes events to handlers
//! registered per (target, event type) pair.

use rustc_hash::FxHashMap;

/// Numeric event type identifier
pub type EventType = u32;

/// Well-known event type constants
pub mod event_types {
    use super::EventType;

    /// Pointer entered the widget's bounds
    pub const POINTER_ENTER: EventType = 1;
    /// Pointer left the widget's bounds
    pub const POINTER_LEAVE: EventType = 2;
    /// Pointer button pressed inside the widget
    pub const POINTER_DOWN: EventType = 3;
    /// Pointer button released
    pub const POINTER_UP: EventType = 4;
    /// Widget gained keyboard focus
    pub const FOCUS: EventType = 5;
    /// Widget lost keyboard focus
    pub const BLUR: EventType = 6;
    /// Committed text from the keyboard or IME
    pub const TEXT_INPUT: EventType = 7;
    /// Non-text key press
    pub const KEY_DOWN: EventType = 8;
    /// The widget's container was resized
    pub const RESIZE: EventType = 9;
}

/// Key codes for non-text keys
///
/// A newtype over `u32` so the constants can be used directly in match
/// patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(0x08);
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const DELETE: KeyCode = KeyCode(0x7F);
    pub const LEFT: KeyCode = KeyCode(0x100);
    pub const RIGHT: KeyCode = KeyCode(0x101);
    pub const UP: KeyCode = KeyCode(0x102);
    pub const DOWN: KeyCode = KeyCode(0x103);
    pub const HOME: KeyCode = KeyCode(0x104);
    pub const END: KeyCode = KeyCode(0x105);
    pub const A: KeyCode = KeyCode(0x41);
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key is held
    pub shift: bool,
    /// Control key is held
    pub ctrl: bool,
    /// Alt key is held (Option on macOS)
    pub alt: bool,
    /// Meta key is held (Command on macOS, Windows key on Windows)
    pub meta: bool,
}

impl Modifiers {
    /// Check if no modifiers are held
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }

    /// Check if shift is held
    pub fn shift(&self) -> bool {
        self.shift
    }

    /// Check if the platform command modifier is held (Command on
    /// macOS, Control elsewhere)
    pub fn command(&self) -> bool {
        self.meta || self.ctrl
    }
}

/// Typed event payload
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventData {
    /// No payload
    #[default]
    None,
    /// Pointer position in widget coordinates
    Pointer { x: f32, y: f32 },
    /// Committed text (may be more than one character, e.g. paste)
    TextInput { text: String },
    /// Non-text key press
    Key { key: KeyCode, modifiers: Modifiers },
    /// New container size
    Resize { width: f32, height: f32 },
}

/// A normalized input event
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event type (one of [`event_types`] or a custom value)
    pub event_type: EventType,
    /// Opaque target id (0 = unrouted)
    pub target: u64,
    /// Typed payload
    pub data: EventData,
}

impl Event {
    pub fn new(event_type: EventType, data: EventData) -> Self {
        Self {
            event_type,
            target: 0,
            data,
        }
    }

    pub fn pointer_enter() -> Self {
        Self::new(event_types::POINTER_ENTER, EventData::None)
    }

    pub fn pointer_leave() -> Self {
        Self::new(event_types::POINTER_LEAVE, EventData::None)
    }

    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::new(event_types::POINTER_DOWN, EventData::Pointer { x, y })
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::new(event_types::POINTER_UP, EventData::Pointer { x, y })
    }

    pub fn focus() -> Self {
        Self::new(event_types::FOCUS, EventData::None)
    }

    pub fn blur() -> Self {
        Self::new(event_types::BLUR, EventData::None)
    }

    pub fn text_input(text: impl Into<String>) -> Self {
        Self::new(
            event_types::TEXT_INPUT,
            EventData::TextInput { text: text.into() },
        )
    }

    pub fn key(key: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(event_types::KEY_DOWN, EventData::Key { key, modifiers })
    }

    pub fn resize(width: f32, height: f32) -> Self {
        Self::new(event_types::RESIZE, EventData::Resize { width, height })
    }
}

type Handler = Box<dyn Fn(&Event) + Send + Sync>;

/// Routes events to handlers registered per (target, event type)
#[derive(Default)]
pub struct EventDispatcher {
    handlers: FxHashMap<(u64, EventType), Vec<Handler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event type on a target
    pub fn register<F>(&mut self, target: u64, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers
            .entry((target, event_type))
            .or_default()
            .push(Box::new(handler));
    }

    /// Remove all handlers for a target
    pub fn unregister(&mut self, target: u64) {
        self.handlers.retain(|(t, _), _| *t != target);
    }

    /// Dispatch an event to every handler registered for its
    /// (target, event type) pair
    pub fn dispatch(&self, event: &Event) {
        if let Some(handlers) = self.handlers.get(&(event.target, event.event_type)) {
            for handler in handlers {
                handler(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispatcher_routes_by_target_and_type() {
        let mut dispatcher = EventDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        dispatcher.register(7, event_types::FOCUS, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Event::focus();
        event.target = 7;
        dispatcher.dispatch(&event);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Different target: not delivered
        event.target = 8;
        dispatcher.dispatch(&event);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Different type on the right target: not delivered
        let mut blur = Event::blur();
        blur.target = 7;
        dispatcher.dispatch(&blur);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatcher_unregister() {
        let mut dispatcher = EventDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        dispatcher.register(1, event_types::BLUR, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        dispatcher.unregister(1);

        let mut event = Event::blur();
        event.target = 1;
        dispatcher.dispatch(&event);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_keycode_patterns() {
        let key = KeyCode::BACKSPACE;
        let matched = matches!(key, KeyCode::BACKSPACE);
        assert!(matched);
        assert!(!matches!(key, KeyCode::DELETE));
    }

    #[test]
    fn test_modifiers_command() {
        let none = Modifiers::default();
        assert!(none.is_empty());
        assert!(!none.command());

        let meta = Modifiers {
            meta: true,
            ..Default::default()
        };
        assert!(meta.command());

        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert!(ctrl.command());
    }
}
