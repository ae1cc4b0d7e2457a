//! Flat state machines for widget interaction states
//!
//! A [`StateMachine`] is a transition table over numeric state and event
//! ids. Widgets declare their interaction states (idle, hovered,
//! focused, ...) as `u32` constants and wire transitions with the
//! builder; unknown (state, event) pairs are ignored.

use smallvec::SmallVec;
use tracing::trace;

/// Numeric state identifier
pub type StateId = u32;

/// Numeric event identifier (shares the space of
/// [`crate::events::EventType`])
pub type EventId = u32;

/// A single transition in the table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

/// A flat transition-table state machine
#[derive(Clone, Debug)]
pub struct StateMachine {
    initial: StateId,
    current: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachine {
    /// Start building a machine with the given initial state
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            transitions: SmallVec::new(),
        }
    }

    /// The current state
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Send an event; returns true if a transition fired
    pub fn send(&mut self, event: EventId) -> bool {
        let next = self
            .transitions
            .iter()
            .find(|t| t.from == self.current && t.event == event)
            .map(|t| t.to);

        match next {
            Some(to) if to != self.current => {
                trace!(from = self.current, event, to, "fsm transition");
                self.current = to;
                true
            }
            _ => false,
        }
    }

    /// Reset to the initial state
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Builder for [`StateMachine`]
pub struct StateMachineBuilder {
    initial: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachineBuilder {
    /// Add a transition: in `from`, on `event`, go to `to`
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition { from, event, to });
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            initial: self.initial,
            current: self.initial,
            transitions: self.transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: StateId = 0;
    const HOVERED: StateId = 1;
    const PRESSED: StateId = 2;

    const ENTER: EventId = 10;
    const LEAVE: EventId = 11;
    const DOWN: EventId = 12;

    fn button_fsm() -> StateMachine {
        StateMachine::builder(IDLE)
            .on(IDLE, ENTER, HOVERED)
            .on(HOVERED, LEAVE, IDLE)
            .on(HOVERED, DOWN, PRESSED)
            .build()
    }

    #[test]
    fn test_transitions() {
        let mut fsm = button_fsm();
        assert_eq!(fsm.current_state(), IDLE);

        assert!(fsm.send(ENTER));
        assert_eq!(fsm.current_state(), HOVERED);

        assert!(fsm.send(DOWN));
        assert_eq!(fsm.current_state(), PRESSED);
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let mut fsm = button_fsm();
        assert!(!fsm.send(LEAVE)); // no IDLE + LEAVE transition
        assert_eq!(fsm.current_state(), IDLE);

        assert!(!fsm.send(999));
        assert_eq!(fsm.current_state(), IDLE);
    }

    #[test]
    fn test_reset() {
        let mut fsm = button_fsm();
        fsm.send(ENTER);
        fsm.send(DOWN);
        assert_eq!(fsm.current_state(), PRESSED);

        fsm.reset();
        assert_eq!(fsm.current_state(), IDLE);
    }
}
