//! Widget Context - manages widget state, FSM, and dirty tracking
//!
//! The WidgetContext provides:
//! - Widget registration with generational ids
//! - Typed per-widget state storage
//! - FSM-driven interaction states
//! - Event dispatch and handling
//! - Dirty tracking for incremental re-renders
//!
//! Widgets themselves are thin handles (id + configuration +
//! callbacks); everything mutable lives here, keyed by [`WidgetId`].

use std::any::Any;
use std::collections::HashSet;

use pinfield_core::events::{Event, EventDispatcher, EventType};
use pinfield_core::fsm::{EventId, StateMachine};
use slotmap::{Key, SlotMap};

use crate::widget::WidgetId;

/// Trait for widget state types
///
/// Any type that can be stored as widget state must implement this
/// trait; the `as_any` methods enable type-safe downcasting.
pub trait WidgetState: Send + 'static {
    /// Get self as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Get self as mutable Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Blanket implementation for all types
impl<T: Send + 'static> WidgetState for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Data stored for each registered widget
#[derive(Default)]
struct WidgetData {
    /// Optional FSM for interaction states
    fsm: Option<StateMachine>,
    /// Custom state (type-erased)
    state: Option<Box<dyn WidgetState>>,
}

/// Dirty tracking for incremental re-renders
#[derive(Default)]
pub struct DirtyTracker {
    dirty: HashSet<WidgetId>,
    /// Whether layout needs to be re-solved
    needs_layout: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a widget as dirty (needs re-render)
    pub fn mark(&mut self, id: WidgetId) {
        self.dirty.insert(id);
    }

    /// Mark layout as needing a re-solve
    pub fn mark_layout(&mut self) {
        self.needs_layout = true;
    }

    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.dirty.contains(&id)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Take all dirty widget ids (clears the set)
    pub fn take_dirty(&mut self) -> Vec<WidgetId> {
        self.dirty.drain().collect()
    }

    /// Clear all dirty flags
    pub fn clear_all(&mut self) {
        self.dirty.clear();
        self.needs_layout = false;
    }
}

/// The main widget context
///
/// Central coordinator for widget registration, state machines, event
/// dispatch, and dirty tracking. Not thread-safe by design: all state
/// transitions happen synchronously on the caller's thread.
#[derive(Default)]
pub struct WidgetContext {
    widgets: SlotMap<WidgetId, WidgetData>,
    dirty: DirtyTracker,
    /// Event dispatcher for per-widget handlers
    pub events: EventDispatcher,
}

impl WidgetContext {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Widget Registration
    // =========================================================================

    /// Register a new widget and get its id
    pub fn register_widget(&mut self) -> WidgetId {
        let id = self.widgets.insert(WidgetData::default());
        self.dirty.mark(id);
        id
    }

    /// Register a widget with a state machine
    pub fn register_widget_with_fsm(&mut self, fsm: StateMachine) -> WidgetId {
        let id = self.widgets.insert(WidgetData {
            fsm: Some(fsm),
            state: None,
        });
        self.dirty.mark(id);
        id
    }

    /// Unregister a widget, dropping its state and handlers
    pub fn unregister_widget(&mut self, id: WidgetId) {
        if self.widgets.remove(id).is_some() {
            self.events.unregister(id.data().as_ffi());
        }
    }

    /// Check if a widget is registered
    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    // =========================================================================
    // State Machine Integration
    // =========================================================================

    /// Send an event to a widget's FSM
    ///
    /// Returns true if the FSM transitioned to a new state.
    pub fn send_fsm_event(&mut self, id: WidgetId, event: EventId) -> bool {
        if let Some(data) = self.widgets.get_mut(id) {
            if let Some(ref mut fsm) = data.fsm {
                if fsm.send(event) {
                    self.dirty.mark(id);
                    return true;
                }
            }
        }
        false
    }

    /// Get a widget's current FSM state
    pub fn get_fsm_state(&self, id: WidgetId) -> Option<u32> {
        self.widgets
            .get(id)
            .and_then(|d| d.fsm.as_ref())
            .map(|fsm| fsm.current_state())
    }

    // =========================================================================
    // Widget State
    // =========================================================================

    /// Set custom state for a widget
    pub fn set_widget_state<S: WidgetState>(&mut self, id: WidgetId, state: S) {
        if let Some(data) = self.widgets.get_mut(id) {
            data.state = Some(Box::new(state));
            self.dirty.mark(id);
        }
    }

    /// Get custom state for a widget (immutable)
    pub fn get_widget_state<S: 'static>(&self, id: WidgetId) -> Option<&S> {
        self.widgets
            .get(id)
            .and_then(|d| d.state.as_ref())
            .and_then(|s| (**s).as_any().downcast_ref())
    }

    /// Get custom state for a widget (mutable)
    pub fn get_widget_state_mut<S: 'static>(&mut self, id: WidgetId) -> Option<&mut S> {
        self.widgets
            .get_mut(id)
            .and_then(|d| d.state.as_mut())
            .and_then(|s| (**s).as_any_mut().downcast_mut())
    }

    // =========================================================================
    // Dirty Tracking
    // =========================================================================

    /// Mark a widget as needing re-render
    pub fn mark_dirty(&mut self, id: WidgetId) {
        self.dirty.mark(id);
    }

    /// Mark layout as needing a re-solve
    pub fn mark_layout(&mut self) {
        self.dirty.mark_layout();
    }

    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.dirty.is_dirty(id)
    }

    pub fn has_dirty(&self) -> bool {
        self.dirty.has_dirty()
    }

    pub fn needs_layout(&self) -> bool {
        self.dirty.needs_layout()
    }

    /// Take all dirty widget ids (clears the set)
    pub fn take_dirty(&mut self) -> Vec<WidgetId> {
        self.dirty.take_dirty()
    }

    /// Clear all dirty flags (call after rendering)
    pub fn clear_dirty(&mut self) {
        self.dirty.clear_all();
    }

    /// Get the dirty tracker
    pub fn dirty_tracker(&self) -> &DirtyTracker {
        &self.dirty
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Dispatch an event to a widget's FSM and registered handlers
    pub fn dispatch_event(&mut self, id: WidgetId, event: &Event) {
        self.send_fsm_event(id, event.event_type);

        let mut routed = event.clone();
        routed.target = id.data().as_ffi();
        self.events.dispatch(&routed);
    }

    /// Register an event handler for a widget
    pub fn on_event<F>(&mut self, id: WidgetId, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events
            .register(id.data().as_ffi(), event_type, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinfield_core::events::event_types;

    #[derive(Debug)]
    struct TestState {
        value: i32,
    }

    #[test]
    fn test_widget_registration() {
        let mut ctx = WidgetContext::new();
        let id1 = ctx.register_widget();
        let id2 = ctx.register_widget();

        assert!(ctx.is_registered(id1));
        assert!(ctx.is_registered(id2));
        assert_ne!(id1, id2);

        ctx.unregister_widget(id1);
        assert!(!ctx.is_registered(id1));
        assert!(ctx.is_registered(id2));
    }

    #[test]
    fn test_widget_state_storage() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();

        ctx.set_widget_state(id, TestState { value: 42 });

        let state = ctx.get_widget_state::<TestState>(id);
        assert!(state.is_some(), "State should be retrievable");
        assert_eq!(state.unwrap().value, 42);

        let state_mut = ctx.get_widget_state_mut::<TestState>(id);
        state_mut.unwrap().value = 100;

        let state = ctx.get_widget_state::<TestState>(id);
        assert_eq!(state.unwrap().value, 100);
    }

    #[test]
    fn test_fsm_integration() {
        const IDLE: u32 = 0;
        const FOCUSED: u32 = 1;

        let mut ctx = WidgetContext::new();
        let fsm = StateMachine::builder(IDLE)
            .on(IDLE, event_types::FOCUS, FOCUSED)
            .on(FOCUSED, event_types::BLUR, IDLE)
            .build();
        let id = ctx.register_widget_with_fsm(fsm);
        ctx.clear_dirty();

        assert_eq!(ctx.get_fsm_state(id), Some(IDLE));

        assert!(ctx.send_fsm_event(id, event_types::FOCUS));
        assert_eq!(ctx.get_fsm_state(id), Some(FOCUSED));
        assert!(ctx.is_dirty(id));

        // Event with no transition does not mark dirty
        ctx.clear_dirty();
        assert!(!ctx.send_fsm_event(id, event_types::POINTER_UP));
        assert!(!ctx.is_dirty(id));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut ctx = WidgetContext::new();
        let id1 = ctx.register_widget();
        let id2 = ctx.register_widget();

        ctx.clear_dirty();
        assert!(!ctx.has_dirty());

        ctx.mark_dirty(id1);
        assert!(ctx.has_dirty());
        assert!(ctx.is_dirty(id1));
        assert!(!ctx.is_dirty(id2));

        let dirty = ctx.take_dirty();
        assert_eq!(dirty, vec![id1]);
        assert!(!ctx.has_dirty());
    }

    #[test]
    fn test_event_handler_routing() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();

        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        ctx.on_event(id, event_types::FOCUS, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        ctx.dispatch_event(id, &Event::focus());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Unregistering drops the handler
        ctx.unregister_widget(id);
        ctx.dispatch_event(id, &Event::focus());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
