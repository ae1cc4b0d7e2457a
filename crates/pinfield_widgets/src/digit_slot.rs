//! DigitSlotInput widget with FSM-driven interactions
//!
//! A segmented digit-entry control: a row of character cells, each with
//! an underline, mirroring the value of a hidden proxy input. The
//! widget provides:
//! - Whole-string edit validation (length cap + character predicate)
//! - Per-character reveal animation (none, dissolve, or spring)
//! - Next-digit underline highlighting
//! - Focus forwarding to the hidden proxy
//! - Change notification after every committed edit
//!
//! The proxy input owns the authoritative string; every keyboard or IME
//! edit is intercepted as a proposed edit over it and either committed
//! or silently refused. Slot labels and underline colors are re-derived
//! from the committed value synchronously after every accepted change.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use pinfield_animation::{Easing, Spring, SpringConfig, Tween};
use pinfield_core::events::{event_types, Event, EventData, KeyCode};
use pinfield_core::fsm::StateMachine;
use pinfield_core::{Color, Size};
use thiserror::Error;
use tracing::{debug, trace};

use crate::context::WidgetContext;
use crate::slot_layout::{SlotGeometry, DEFAULT_SPACING};
use crate::widget::{Widget, WidgetId};

/// Duration of the dissolve reveal
const DISSOLVE_DURATION_MS: u32 = 180;

/// Rise distance fallback used before the first layout pass
const DEFAULT_RISE: f32 = 16.0;

/// DigitSlotInput FSM states
pub mod states {
    /// Idle state (unfocused, not hovered)
    pub const IDLE: u32 = 0;
    /// Hovered state (unfocused, pointer over the widget)
    pub const HOVERED: u32 = 1;
    /// Focused state (proxy is accepting input)
    pub const FOCUSED: u32 = 2;
    /// Focused and hovered
    pub const FOCUSED_HOVERED: u32 = 3;
}

/// Keyboard type hint forwarded to the proxy input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyboardType {
    /// Platform default keyboard
    Standard,
    /// Digits-only pad
    #[default]
    NumberPad,
    /// Digits plus decimal separator
    DecimalPad,
    /// ASCII-capable keyboard
    AsciiCapable,
}

/// Keyboard appearance hint forwarded to the proxy input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyboardAppearance {
    /// Follow the platform appearance
    #[default]
    Automatic,
    Light,
    Dark,
}

/// Content-type hint forwarded to the proxy input (enables platform
/// autofill, e.g. one-time codes from messages)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentTypeHint {
    None,
    #[default]
    OneTimeCode,
    Password,
}

/// Keyboard configuration forwarded verbatim to the proxy input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardOptions {
    pub keyboard_type: KeyboardType,
    pub appearance: KeyboardAppearance,
    pub content_type: ContentTypeHint,
}

/// Predicate over the characters a committed value may contain
///
/// Validation always runs over the whole resulting string of a
/// proposed edit, not just the inserted fragment.
#[derive(Clone, Default)]
pub enum AcceptedCharacters {
    /// Decimal digits only (the default)
    #[default]
    Digits,
    /// ASCII letters and digits
    Alphanumeric,
    /// Arbitrary predicate
    Custom(Arc<dyn Fn(char) -> bool + Send + Sync>),
}

impl AcceptedCharacters {
    /// Check if a single character is allowed
    pub fn allows(&self, c: char) -> bool {
        match self {
            AcceptedCharacters::Digits => c.is_ascii_digit(),
            AcceptedCharacters::Alphanumeric => c.is_ascii_alphanumeric(),
            AcceptedCharacters::Custom(predicate) => predicate(c),
        }
    }

    /// Find the first disallowed character in a candidate value
    pub fn first_disallowed(&self, value: &str) -> Option<char> {
        value.chars().find(|c| !self.allows(*c))
    }
}

impl fmt::Debug for AcceptedCharacters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptedCharacters::Digits => write!(f, "Digits"),
            AcceptedCharacters::Alphanumeric => write!(f, "Alphanumeric"),
            AcceptedCharacters::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Visual treatment played when a slot reveals a new character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryAnimation {
    /// Immediate swap
    #[default]
    None,
    /// Cross-fade the label in over a fixed short duration
    Dissolve,
    /// Slide the label up from below the cell with a damped spring
    Spring,
}

/// The reason a proposed edit was refused
///
/// Refusals are silent at the event surface; this type is the internal
/// accept/reject channel for embedders driving the proposal API
/// directly.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RejectedEdit {
    #[error("resulting value would exceed {capacity} digits")]
    TooLong { capacity: usize },
    #[error("character {0:?} is not acceptable")]
    DisallowedCharacter(char),
}

/// DigitSlotInput configuration
#[derive(Clone, Debug)]
pub struct DigitSlotConfig {
    /// Number of character cells
    pub num_digits: usize,
    /// Underline color for cells other than the next-to-fill one
    pub underline_color: Color,
    /// Underline color marking the next-to-fill cell
    pub next_underline_color: Color,
    /// Label text color
    pub text_color: Color,
    /// Label font family; None uses the platform label default
    pub font_family: Option<String>,
    /// Character predicate for committed values
    pub accepted: AcceptedCharacters,
    /// Reveal animation for forward edits
    pub animation: EntryAnimation,
    /// Keyboard hints forwarded to the proxy input
    pub keyboard: KeyboardOptions,
    /// Gap around and between cells
    pub spacing: f32,
}

impl Default for DigitSlotConfig {
    fn default() -> Self {
        Self {
            num_digits: 4,
            underline_color: Color::rgba(0.3, 0.3, 0.35, 1.0),
            next_underline_color: Color::rgba(0.4, 0.6, 1.0, 1.0),
            text_color: Color::rgba(0.9, 0.9, 0.9, 1.0),
            font_family: None,
            accepted: AcceptedCharacters::Digits,
            animation: EntryAnimation::None,
            keyboard: KeyboardOptions::default(),
            spacing: DEFAULT_SPACING,
        }
    }
}

impl DigitSlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of character cells
    pub fn num_digits(mut self, n: usize) -> Self {
        self.num_digits = n;
        self
    }

    /// Set the default underline color
    pub fn underline_color(mut self, color: impl Into<Color>) -> Self {
        self.underline_color = color.into();
        self
    }

    /// Set the next-to-fill underline color
    pub fn next_underline_color(mut self, color: impl Into<Color>) -> Self {
        self.next_underline_color = color.into();
        self
    }

    /// Set the label text color
    pub fn text_color(mut self, color: impl Into<Color>) -> Self {
        self.text_color = color.into();
        self
    }

    /// Set the label font family
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set the character predicate
    pub fn accepted(mut self, accepted: AcceptedCharacters) -> Self {
        self.accepted = accepted;
        self
    }

    /// Set the reveal animation
    pub fn animation(mut self, animation: EntryAnimation) -> Self {
        self.animation = animation;
        self
    }

    /// Set the keyboard hints
    pub fn keyboard(mut self, keyboard: KeyboardOptions) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Set the inter-cell spacing
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }
}

/// The hidden text-input proxy
///
/// Owns the authoritative current string and the keyboard hints. The
/// widget creates, configures, and drives it; it is never exposed for
/// external mutation.
#[derive(Clone, Debug)]
pub struct ProxyInput {
    value: String,
    keyboard: KeyboardOptions,
    focused: bool,
}

impl ProxyInput {
    fn new(keyboard: KeyboardOptions) -> Self {
        Self {
            value: String::new(),
            keyboard,
            focused: false,
        }
    }

    /// The authoritative current value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the proxy is the platform's input-receiving element
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Keyboard hints in effect
    pub fn keyboard(&self) -> KeyboardOptions {
        self.keyboard
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn set_keyboard(&mut self, keyboard: KeyboardOptions) {
        self.keyboard = keyboard;
    }
}

/// Apply a proposed edit (char-indexed range replacement) to a value
fn resolve_edit(current: &str, range: Range<usize>, replacement: &str) -> String {
    let chars: Vec<char> = current.chars().collect();
    let start = range.start.min(chars.len());
    let end = range.end.clamp(start, chars.len());

    let mut result = String::with_capacity(current.len() + replacement.len());
    result.extend(chars[..start].iter());
    result.push_str(replacement);
    result.extend(chars[end..].iter());
    result
}

/// In-flight reveal animation on a slot
#[derive(Clone, Debug)]
enum SlotAnimation {
    Rise(Spring),
    Fade(Tween<f32>),
}

/// Per-index visual state: one label plus one underline
///
/// `offset_y` and `opacity` are transient animation outputs; the label
/// and underline color are always the committed logical state.
#[derive(Clone, Debug)]
pub struct Slot {
    label: Option<char>,
    underline_color: Color,
    offset_y: f32,
    opacity: f32,
    animation: Option<SlotAnimation>,
}

impl Slot {
    fn new(underline_color: Color) -> Self {
        Self {
            label: None,
            underline_color,
            offset_y: 0.0,
            opacity: 1.0,
            animation: None,
        }
    }

    /// The displayed character, if any
    pub fn label(&self) -> Option<char> {
        self.label
    }

    /// Current underline color (default or next-digit highlight)
    pub fn underline_color(&self) -> Color {
        self.underline_color
    }

    /// Vertical label offset from the reveal animation
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    /// Label opacity from the reveal animation
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether a reveal animation is in flight
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Start a reveal animation, replacing any previous one
    fn start_animation(&mut self, kind: EntryAnimation, rise_distance: f32) {
        self.offset_y = 0.0;
        self.opacity = 1.0;
        self.animation = match kind {
            EntryAnimation::None => None,
            EntryAnimation::Dissolve => {
                self.opacity = 0.0;
                Some(SlotAnimation::Fade(Tween::new(
                    0.0,
                    1.0,
                    DISSOLVE_DURATION_MS,
                    Easing::EaseOut,
                )))
            }
            EntryAnimation::Spring => {
                self.offset_y = rise_distance;
                let mut spring = Spring::new(SpringConfig::wobbly(), rise_distance);
                spring.set_target(0.0);
                Some(SlotAnimation::Rise(spring))
            }
        };
    }

    /// Drop any in-flight animation and restore resting visuals
    fn clear_animation(&mut self) {
        self.offset_y = 0.0;
        self.opacity = 1.0;
        self.animation = None;
    }

    /// Advance the animation; returns true while still in flight
    fn step_animation(&mut self, dt: f32) -> bool {
        match self.animation {
            Some(SlotAnimation::Rise(ref mut spring)) => {
                spring.step(dt);
                self.offset_y = spring.value();
                if spring.is_settled() {
                    self.offset_y = 0.0;
                    self.animation = None;
                    false
                } else {
                    true
                }
            }
            Some(SlotAnimation::Fade(ref mut tween)) => {
                tween.step(dt);
                self.opacity = tween.value();
                if tween.is_finished() {
                    self.opacity = 1.0;
                    self.animation = None;
                    false
                } else {
                    true
                }
            }
            None => false,
        }
    }
}

/// DigitSlotInput widget state (stored in the [`WidgetContext`])
pub struct DigitSlotState {
    /// Hidden proxy input holding the authoritative value
    proxy: ProxyInput,
    /// Per-index visual state
    slots: Vec<Slot>,
    /// Geometry from the last layout pass
    geometry: SlotGeometry,
    /// Whether the value changed (cleared after reading)
    changed: bool,
}

impl DigitSlotState {
    fn new(config: &DigitSlotConfig) -> Self {
        let mut state = Self {
            proxy: ProxyInput::new(config.keyboard),
            slots: Vec::new(),
            geometry: SlotGeometry::default(),
            changed: false,
        };
        state.rebuild_slots(config);
        state
    }

    /// The committed value
    pub fn value(&self) -> &str {
        self.proxy.value()
    }

    /// The slot row
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Geometry from the last layout pass
    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    /// The hidden proxy input (read-only)
    pub fn proxy(&self) -> &ProxyInput {
        &self.proxy
    }

    /// Check if the value changed and clear the flag
    fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Tear down and recreate all slots for the current configuration
    ///
    /// Truncates the value if the new capacity is smaller, then
    /// re-derives every label and underline from the committed value.
    fn rebuild_slots(&mut self, config: &DigitSlotConfig) {
        self.slots.clear();
        self.slots
            .resize_with(config.num_digits, || Slot::new(config.underline_color));

        if self.proxy.char_len() > config.num_digits {
            let truncated: String = self.proxy.value().chars().take(config.num_digits).collect();
            self.proxy.set_value(truncated);
            self.changed = true;
        }

        self.geometry = SlotGeometry::solve(self.geometry.container, config.num_digits, config.spacing);
        self.sync(config, None);
    }

    /// Re-derive slot labels and underline colors from the value
    ///
    /// `animate_index` starts a reveal animation on that slot (forward
    /// edits only; deletions and programmatic writes pass None).
    fn sync(&mut self, config: &DigitSlotConfig, animate_index: Option<usize>) {
        let chars: Vec<char> = self.proxy.value().chars().collect();

        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.label = chars.get(i).copied();
            slot.underline_color = config.underline_color;
            // A slot emptied by a deletion must not keep animating
            if slot.label.is_none() {
                slot.clear_animation();
            }
        }
        if let Some(slot) = self.slots.get_mut(chars.len()) {
            slot.underline_color = config.next_underline_color;
        }

        if let Some(index) = animate_index {
            let rise = if self.geometry.cell.height > 0.0 {
                self.geometry.cell.height
            } else {
                DEFAULT_RISE
            };
            if let Some(slot) = self.slots.get_mut(index) {
                slot.start_animation(config.animation, rise);
            }
        }
    }

    /// Evaluate a proposed edit and commit it if valid
    fn propose_edit(
        &mut self,
        config: &DigitSlotConfig,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<(), RejectedEdit> {
        let candidate = resolve_edit(self.proxy.value(), range, replacement);
        let candidate_len = candidate.chars().count();

        if candidate_len > config.num_digits {
            return Err(RejectedEdit::TooLong {
                capacity: config.num_digits,
            });
        }
        if let Some(c) = config.accepted.first_disallowed(&candidate) {
            return Err(RejectedEdit::DisallowedCharacter(c));
        }

        // Entry animation only for forward (non-deletion) edits, on the
        // last-written slot
        let forward = candidate_len > self.proxy.char_len();
        let animate_index = if forward { Some(candidate_len - 1) } else { None };

        self.proxy.set_value(candidate);
        self.sync(config, animate_index);
        self.changed = true;
        Ok(())
    }

    /// Advance all slot animations; returns true while any is in flight
    fn step_animations(&mut self, dt: f32) -> bool {
        let mut animating = false;
        for slot in &mut self.slots {
            if slot.step_animation(dt) {
                animating = true;
            }
        }
        animating
    }
}

/// DigitSlotInput widget
///
/// A thin handle: configuration and callbacks live here, mutable state
/// lives in the [`WidgetContext`] under the widget's id.
pub struct DigitSlotInput {
    id: WidgetId,
    config: DigitSlotConfig,
    /// Change callback, invoked with the committed value after render
    on_change: Option<Box<dyn FnMut(&str) + Send>>,
}

impl Widget for DigitSlotInput {
    fn id(&self) -> WidgetId {
        self.id
    }
}

impl DigitSlotInput {
    /// Create a digit-slot input with the default configuration
    pub fn new(ctx: &mut WidgetContext) -> Self {
        Self::with_config(ctx, DigitSlotConfig::default())
    }

    /// Create a digit-slot input with a custom configuration
    pub fn with_config(ctx: &mut WidgetContext, config: DigitSlotConfig) -> Self {
        let id = ctx.register_widget_with_fsm(Self::create_fsm());
        ctx.set_widget_state(id, DigitSlotState::new(&config));

        Self {
            id,
            config,
            on_change: None,
        }
    }

    /// Create the interaction FSM
    fn create_fsm() -> StateMachine {
        StateMachine::builder(states::IDLE)
            // Idle transitions
            .on(states::IDLE, event_types::POINTER_ENTER, states::HOVERED)
            .on(states::IDLE, event_types::POINTER_DOWN, states::FOCUSED)
            .on(states::IDLE, event_types::FOCUS, states::FOCUSED)
            // Hovered transitions
            .on(states::HOVERED, event_types::POINTER_LEAVE, states::IDLE)
            .on(states::HOVERED, event_types::POINTER_DOWN, states::FOCUSED_HOVERED)
            .on(states::HOVERED, event_types::FOCUS, states::FOCUSED_HOVERED)
            // Focused transitions
            .on(states::FOCUSED, event_types::BLUR, states::IDLE)
            .on(states::FOCUSED, event_types::POINTER_ENTER, states::FOCUSED_HOVERED)
            // Focused+Hovered transitions
            .on(states::FOCUSED_HOVERED, event_types::POINTER_LEAVE, states::FOCUSED)
            .on(states::FOCUSED_HOVERED, event_types::BLUR, states::HOVERED)
            .build()
    }

    /// Get the widget id
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The current configuration
    pub fn config(&self) -> &DigitSlotConfig {
        &self.config
    }

    /// Whether the widget (via its proxy) holds keyboard focus
    pub fn is_focused(&self, ctx: &WidgetContext) -> bool {
        let state = ctx.get_fsm_state(self.id).unwrap_or(states::IDLE);
        matches!(state, states::FOCUSED | states::FOCUSED_HOVERED)
    }

    /// Whether the widget can accept focus (always true)
    pub fn can_focus(&self) -> bool {
        true
    }

    /// Request focus; forwards to the hidden proxy
    pub fn focus(&self, ctx: &mut WidgetContext) {
        ctx.send_fsm_event(self.id, event_types::FOCUS);
        if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            state.proxy.set_focused(true);
        }
        debug!(widget = ?self.id, "digit slot focused");
        ctx.mark_dirty(self.id);
    }

    /// Resign focus; forwards to the hidden proxy
    pub fn resign_focus(&self, ctx: &mut WidgetContext) {
        ctx.send_fsm_event(self.id, event_types::BLUR);
        if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            state.proxy.set_focused(false);
        }
        debug!(widget = ?self.id, "digit slot resigned focus");
        ctx.mark_dirty(self.id);
    }

    /// The committed value
    pub fn text(&self, ctx: &WidgetContext) -> String {
        ctx.get_widget_state::<DigitSlotState>(self.id)
            .map(|s| s.value().to_string())
            .unwrap_or_default()
    }

    /// Set the value programmatically
    ///
    /// A read/write view onto the proxy: the character predicate is not
    /// consulted, but the value is truncated to capacity. Renders
    /// without entry animation and fires the change callback once.
    pub fn set_text(&mut self, ctx: &mut WidgetContext, value: impl Into<String>) {
        let value: String = value.into().chars().take(self.config.num_digits).collect();
        if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            state.proxy.set_value(value);
            state.sync(&self.config, None);
            state.changed = true;
        }
        ctx.mark_dirty(self.id);
        self.notify(ctx);
    }

    /// Propose an edit over the current value (char-indexed range +
    /// replacement text)
    ///
    /// The hypothetical resulting string is validated as a whole:
    /// refused if it exceeds capacity or contains a disallowed
    /// character, committed and rendered otherwise.
    pub fn propose_edit(
        &mut self,
        ctx: &mut WidgetContext,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<(), RejectedEdit> {
        let result = match ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            Some(state) => state.propose_edit(&self.config, range.clone(), replacement),
            None => return Ok(()),
        };

        match &result {
            Ok(()) => {
                debug!(widget = ?self.id, ?range, replacement, "edit accepted");
                ctx.mark_dirty(self.id);
                self.notify(ctx);
            }
            Err(reason) => {
                debug!(widget = ?self.id, ?range, replacement, %reason, "edit rejected");
            }
        }
        result
    }

    /// Set the change callback
    pub fn on_change<F: FnMut(&str) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Handle an event
    pub fn handle_event(&mut self, ctx: &mut WidgetContext, event: &Event) {
        // Dispatch to the FSM (and any registered handlers) first so
        // focus transitions land before text is evaluated
        ctx.dispatch_event(self.id, event);

        // Focus forwarding to the hidden proxy
        match event.event_type {
            event_types::POINTER_DOWN | event_types::FOCUS => {
                if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
                    state.proxy.set_focused(true);
                }
            }
            event_types::BLUR => {
                if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
                    state.proxy.set_focused(false);
                }
            }
            _ => {}
        }

        if let EventData::Resize { width, height } = event.data {
            self.layout(ctx, Size::new(width, height));
            return;
        }

        if !self.is_focused(ctx) {
            return;
        }

        match &event.data {
            EventData::TextInput { text } => {
                let len = ctx
                    .get_widget_state::<DigitSlotState>(self.id)
                    .map(|s| s.proxy.char_len())
                    .unwrap_or(0);
                // Refusals are silent at this surface
                let _ = self.propose_edit(ctx, len..len, text);
            }
            EventData::Key { key, .. } => {
                if *key == KeyCode::BACKSPACE {
                    let len = ctx
                        .get_widget_state::<DigitSlotState>(self.id)
                        .map(|s| s.proxy.char_len())
                        .unwrap_or(0);
                    if len > 0 {
                        let _ = self.propose_edit(ctx, len - 1..len, "");
                    }
                }
            }
            _ => {}
        }
    }

    /// Re-solve slot geometry for a new container size
    pub fn layout(&self, ctx: &mut WidgetContext, container: Size) {
        if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            state.geometry = SlotGeometry::solve(container, self.config.num_digits, self.config.spacing);
            trace!(widget = ?self.id, ?container, "slot row layout solved");
        }
        ctx.mark_dirty(self.id);
    }

    /// Advance reveal animations (call each frame)
    pub fn update(&self, ctx: &mut WidgetContext, dt: f32) {
        let animating = ctx
            .get_widget_state_mut::<DigitSlotState>(self.id)
            .map(|s| s.step_animations(dt))
            .unwrap_or(false);
        if animating {
            ctx.mark_dirty(self.id);
        }
    }

    /// Geometry from the last layout pass
    pub fn geometry(&self, ctx: &WidgetContext) -> SlotGeometry {
        ctx.get_widget_state::<DigitSlotState>(self.id)
            .map(|s| s.geometry)
            .unwrap_or_default()
    }

    /// The slot row
    pub fn slots<'c>(&self, ctx: &'c WidgetContext) -> &'c [Slot] {
        ctx.get_widget_state::<DigitSlotState>(self.id)
            .map(|s| s.slots())
            .unwrap_or(&[])
    }

    // =========================================================================
    // Property setters
    //
    // Explicit setters stand in for property observers: each stores the
    // new value, then runs the rebuild / re-render / re-layout step the
    // property requires.
    // =========================================================================

    /// Set the number of digits; rebuilds all slots
    pub fn set_num_digits(&mut self, ctx: &mut WidgetContext, n: usize) {
        self.config.num_digits = n;
        self.rebuild(ctx);
    }

    /// Set the default underline color; rebuilds all slots
    pub fn set_underline_color(&mut self, ctx: &mut WidgetContext, color: Color) {
        self.config.underline_color = color;
        self.rebuild(ctx);
    }

    /// Set the next-to-fill underline color; rebuilds all slots
    pub fn set_next_underline_color(&mut self, ctx: &mut WidgetContext, color: Color) {
        self.config.next_underline_color = color;
        self.rebuild(ctx);
    }

    /// Set the label text color
    pub fn set_text_color(&mut self, ctx: &mut WidgetContext, color: Color) {
        self.config.text_color = color;
        ctx.mark_dirty(self.id);
    }

    /// Set the label font family (None restores the platform default)
    pub fn set_font_family(&mut self, ctx: &mut WidgetContext, family: Option<String>) {
        self.config.font_family = family;
        ctx.mark_dirty(self.id);
    }

    /// Set the character predicate (applies to future edits)
    pub fn set_accepted(&mut self, accepted: AcceptedCharacters) {
        self.config.accepted = accepted;
    }

    /// Set the reveal animation (applies to future edits)
    pub fn set_animation(&mut self, animation: EntryAnimation) {
        self.config.animation = animation;
    }

    /// Set keyboard hints; forwarded to the proxy immediately
    pub fn set_keyboard(&mut self, ctx: &mut WidgetContext, keyboard: KeyboardOptions) {
        self.config.keyboard = keyboard;
        if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            state.proxy.set_keyboard(keyboard);
        }
    }

    /// Set the inter-cell spacing; re-solves geometry
    pub fn set_spacing(&mut self, ctx: &mut WidgetContext, spacing: f32) {
        self.config.spacing = spacing;
        let container = self.geometry(ctx).container;
        self.layout(ctx, container);
    }

    /// Tear down and rebuild the slot row, then notify if the value
    /// changed (capacity shrink truncates the committed value)
    fn rebuild(&mut self, ctx: &mut WidgetContext) {
        if let Some(state) = ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            state.rebuild_slots(&self.config);
        }
        debug!(widget = ?self.id, num_digits = self.config.num_digits, "slots rebuilt");
        ctx.mark_dirty(self.id);
        self.notify(ctx);
    }

    /// Invoke the change callback if the committed value changed
    fn notify(&mut self, ctx: &mut WidgetContext) {
        let value = match ctx.get_widget_state_mut::<DigitSlotState>(self.id) {
            Some(state) => {
                if state.take_changed() {
                    state.value().to_string()
                } else {
                    return;
                }
            }
            None => return,
        };
        if let Some(ref mut callback) = self.on_change {
            callback(&value);
        }
    }
}

/// Create a digit-slot input
pub fn digit_slot_input() -> DigitSlotInputBuilder {
    DigitSlotInputBuilder {
        config: DigitSlotConfig::default(),
        on_change: None,
    }
}

/// Builder for creating digit-slot inputs
pub struct DigitSlotInputBuilder {
    config: DigitSlotConfig,
    on_change: Option<Box<dyn FnMut(&str) + Send>>,
}

impl DigitSlotInputBuilder {
    /// Set the number of character cells
    pub fn num_digits(mut self, n: usize) -> Self {
        self.config.num_digits = n;
        self
    }

    /// Set the default underline color
    pub fn underline_color(mut self, color: impl Into<Color>) -> Self {
        self.config.underline_color = color.into();
        self
    }

    /// Set the next-to-fill underline color
    pub fn next_underline_color(mut self, color: impl Into<Color>) -> Self {
        self.config.next_underline_color = color.into();
        self
    }

    /// Set the label text color
    pub fn text_color(mut self, color: impl Into<Color>) -> Self {
        self.config.text_color = color.into();
        self
    }

    /// Set the label font family
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.config.font_family = Some(family.into());
        self
    }

    /// Set the character predicate
    pub fn accepted(mut self, accepted: AcceptedCharacters) -> Self {
        self.config.accepted = accepted;
        self
    }

    /// Set the reveal animation
    pub fn animation(mut self, animation: EntryAnimation) -> Self {
        self.config.animation = animation;
        self
    }

    /// Set the keyboard hints
    pub fn keyboard(mut self, keyboard: KeyboardOptions) -> Self {
        self.config.keyboard = keyboard;
        self
    }

    /// Set the inter-cell spacing
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.config.spacing = spacing;
        self
    }

    /// Set the change callback
    pub fn on_change<F: FnMut(&str) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Build the widget
    pub fn build(self, ctx: &mut WidgetContext) -> DigitSlotInput {
        let mut input = DigitSlotInput::with_config(ctx, self.config);
        input.on_change = self.on_change;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn focused_input(ctx: &mut WidgetContext, config: DigitSlotConfig) -> DigitSlotInput {
        let input = DigitSlotInput::with_config(ctx, config);
        input.focus(ctx);
        input
    }

    fn type_str(input: &mut DigitSlotInput, ctx: &mut WidgetContext, s: &str) {
        for c in s.chars() {
            input.handle_event(ctx, &Event::text_input(c.to_string()));
        }
    }

    fn labels(input: &DigitSlotInput, ctx: &WidgetContext) -> Vec<Option<char>> {
        input.slots(ctx).iter().map(|s| s.label()).collect()
    }

    fn highlighted_indices(input: &DigitSlotInput, ctx: &WidgetContext) -> Vec<usize> {
        let next = input.config().next_underline_color;
        input
            .slots(ctx)
            .iter()
            .enumerate()
            .filter(|(_, s)| s.underline_color() == next)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_typing_mirrors_into_slots() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "129");
        assert_eq!(input.text(&ctx), "129");
        assert_eq!(
            labels(&input, &ctx),
            vec![Some('1'), Some('2'), Some('9'), None]
        );
        assert_eq!(highlighted_indices(&input, &ctx), vec![3]);
    }

    #[test]
    fn test_disallowed_character_is_rejected() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "129");
        type_str(&mut input, &mut ctx, "a");
        assert_eq!(input.text(&ctx), "129");

        let err = input.propose_edit(&mut ctx, 3..3, "a");
        assert_eq!(err, Err(RejectedEdit::DisallowedCharacter('a')));
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "12345");
        assert_eq!(input.text(&ctx), "1234");

        let err = input.propose_edit(&mut ctx, 4..4, "5");
        assert_eq!(err, Err(RejectedEdit::TooLong { capacity: 4 }));
    }

    #[test]
    fn test_full_value_has_no_highlight() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "1294");
        assert_eq!(input.text(&ctx), "1294");
        assert!(highlighted_indices(&input, &ctx).is_empty());
    }

    #[test]
    fn test_backspace_deletes_without_animation() {
        let mut ctx = WidgetContext::new();
        let config = DigitSlotConfig::default().animation(EntryAnimation::Spring);
        let mut input = focused_input(&mut ctx, config);

        type_str(&mut input, &mut ctx, "1294");
        input.handle_event(&mut ctx, &Event::key(KeyCode::BACKSPACE, Default::default()));

        assert_eq!(input.text(&ctx), "129");
        assert_eq!(highlighted_indices(&input, &ctx), vec![3]);
        assert!(input.slots(&ctx).iter().all(|s| !s.is_animating()));
    }

    #[test]
    fn test_backspace_on_empty_is_a_no_op() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        input.handle_event(&mut ctx, &Event::key(KeyCode::BACKSPACE, Default::default()));
        assert_eq!(input.text(&ctx), "");
        assert_eq!(highlighted_indices(&input, &ctx), vec![0]);
    }

    #[test]
    fn test_spec_worked_example() {
        // numberOfDigits=4, digits only: "1","2","9" then "a" rejected,
        // "4" fills, backspace restores the highlight
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "129");
        assert_eq!(input.text(&ctx), "129");
        assert_eq!(highlighted_indices(&input, &ctx), vec![3]);

        type_str(&mut input, &mut ctx, "a");
        assert_eq!(input.text(&ctx), "129");

        type_str(&mut input, &mut ctx, "4");
        assert_eq!(input.text(&ctx), "1294");
        assert!(highlighted_indices(&input, &ctx).is_empty());

        input.handle_event(&mut ctx, &Event::key(KeyCode::BACKSPACE, Default::default()));
        assert_eq!(input.text(&ctx), "129");
        assert_eq!(highlighted_indices(&input, &ctx), vec![3]);
    }

    #[test]
    fn test_set_text_fires_callback_once() {
        let changes = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(std::sync::Mutex::new(String::new()));

        let mut ctx = WidgetContext::new();
        let c = changes.clone();
        let s = seen.clone();
        let mut input = digit_slot_input()
            .on_change(move |value| {
                c.fetch_add(1, Ordering::SeqCst);
                *s.lock().unwrap() = value.to_string();
            })
            .build(&mut ctx);

        input.set_text(&mut ctx, "55");
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap().as_str(), "55");
        assert_eq!(
            labels(&input, &ctx),
            vec![Some('5'), Some('5'), None, None]
        );
        assert!(input.slots(&ctx).iter().all(|s| !s.is_animating()));
    }

    #[test]
    fn test_set_text_truncates_to_capacity() {
        let mut ctx = WidgetContext::new();
        let mut input = DigitSlotInput::with_config(&mut ctx, DigitSlotConfig::default());

        input.set_text(&mut ctx, "123456");
        assert_eq!(input.text(&ctx), "1234");
    }

    #[test]
    fn test_callback_fires_per_accepted_edit_only() {
        let changes = Arc::new(AtomicUsize::new(0));

        let mut ctx = WidgetContext::new();
        let c = changes.clone();
        let mut input = digit_slot_input()
            .on_change(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .build(&mut ctx);
        input.focus(&mut ctx);

        type_str(&mut input, &mut ctx, "12");
        assert_eq!(changes.load(Ordering::SeqCst), 2);

        type_str(&mut input, &mut ctx, "x");
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_grow_num_digits_rebuilds_slots() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "12");
        input.set_num_digits(&mut ctx, 6);

        assert_eq!(input.slots(&ctx).len(), 6);
        assert_eq!(input.text(&ctx), "12");
        assert_eq!(
            labels(&input, &ctx),
            vec![Some('1'), Some('2'), None, None, None, None]
        );
        assert_eq!(highlighted_indices(&input, &ctx), vec![2]);
    }

    #[test]
    fn test_shrink_num_digits_truncates_and_notifies() {
        let changes = Arc::new(AtomicUsize::new(0));

        let mut ctx = WidgetContext::new();
        let c = changes.clone();
        let mut input = digit_slot_input()
            .on_change(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .build(&mut ctx);
        input.focus(&mut ctx);

        type_str(&mut input, &mut ctx, "1234");
        let before = changes.load(Ordering::SeqCst);

        input.set_num_digits(&mut ctx, 2);
        assert_eq!(input.slots(&ctx).len(), 2);
        assert_eq!(input.text(&ctx), "12");
        assert_eq!(changes.load(Ordering::SeqCst), before + 1);

        // Growing back does not change the value, so no extra callback
        input.set_num_digits(&mut ctx, 4);
        assert_eq!(changes.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_fresh_rebuild_highlights_first_underline() {
        let mut ctx = WidgetContext::new();
        let input = DigitSlotInput::with_config(&mut ctx, DigitSlotConfig::default());
        assert_eq!(highlighted_indices(&input, &ctx), vec![0]);
    }

    #[test]
    fn test_zero_digits_is_empty_but_does_not_fail() {
        let mut ctx = WidgetContext::new();
        let config = DigitSlotConfig::default().num_digits(0);
        let mut input = focused_input(&mut ctx, config);

        assert!(input.slots(&ctx).is_empty());
        type_str(&mut input, &mut ctx, "1");
        assert_eq!(input.text(&ctx), "");

        input.layout(&mut ctx, Size::new(300.0, 50.0));
        assert!(input.geometry(&ctx).is_empty());
    }

    #[test]
    fn test_paste_is_validated_as_a_whole() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        // One disallowed character refuses the entire insertion
        input.handle_event(&mut ctx, &Event::text_input("12a4"));
        assert_eq!(input.text(&ctx), "");

        input.handle_event(&mut ctx, &Event::text_input("1294"));
        assert_eq!(input.text(&ctx), "1294");
    }

    #[test]
    fn test_replacement_validates_whole_resulting_string() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "12");
        let err = input.propose_edit(&mut ctx, 0..1, "a");
        assert_eq!(err, Err(RejectedEdit::DisallowedCharacter('a')));
        assert_eq!(input.text(&ctx), "12");

        // A valid replacement commits
        assert!(input.propose_edit(&mut ctx, 0..1, "9").is_ok());
        assert_eq!(input.text(&ctx), "92");
    }

    #[test]
    fn test_custom_predicate() {
        let mut ctx = WidgetContext::new();
        let config = DigitSlotConfig::default()
            .accepted(AcceptedCharacters::Custom(Arc::new(|c| {
                c.is_ascii_hexdigit()
            })))
            .num_digits(6);
        let mut input = focused_input(&mut ctx, config);

        type_str(&mut input, &mut ctx, "1a2b");
        assert_eq!(input.text(&ctx), "1a2b");
        type_str(&mut input, &mut ctx, "z");
        assert_eq!(input.text(&ctx), "1a2b");
    }

    #[test]
    fn test_unfocused_typing_is_ignored() {
        let mut ctx = WidgetContext::new();
        let mut input = DigitSlotInput::with_config(&mut ctx, DigitSlotConfig::default());

        input.handle_event(&mut ctx, &Event::text_input("1"));
        assert_eq!(input.text(&ctx), "");
    }

    #[test]
    fn test_focus_forwarding() {
        let mut ctx = WidgetContext::new();
        let mut input = DigitSlotInput::with_config(&mut ctx, DigitSlotConfig::default());

        assert!(input.can_focus());
        assert!(!input.is_focused(&ctx));

        // Tapping anywhere forwards focus to the proxy
        input.handle_event(&mut ctx, &Event::pointer_down(10.0, 10.0));
        assert!(input.is_focused(&ctx));
        let state = ctx.get_widget_state::<DigitSlotState>(input.id()).unwrap();
        assert!(state.proxy().is_focused());

        input.resign_focus(&mut ctx);
        assert!(!input.is_focused(&ctx));
        let state = ctx.get_widget_state::<DigitSlotState>(input.id()).unwrap();
        assert!(!state.proxy().is_focused());
    }

    #[test]
    fn test_spring_reveal_settles() {
        let mut ctx = WidgetContext::new();
        let config = DigitSlotConfig::default().animation(EntryAnimation::Spring);
        let mut input = focused_input(&mut ctx, config);
        input.layout(&mut ctx, Size::new(300.0, 60.0));

        type_str(&mut input, &mut ctx, "7");
        {
            let slot = &input.slots(&ctx)[0];
            assert!(slot.is_animating());
            assert!(slot.offset_y() > 0.0);
            // Logical state is already committed when the animation starts
            assert_eq!(slot.label(), Some('7'));
        }

        // Two seconds at 60fps is plenty for the spring to settle
        for _ in 0..120 {
            input.update(&mut ctx, 1.0 / 60.0);
        }
        let slot = &input.slots(&ctx)[0];
        assert!(!slot.is_animating());
        assert_eq!(slot.offset_y(), 0.0);
    }

    #[test]
    fn test_dissolve_reveal_fades_in() {
        let mut ctx = WidgetContext::new();
        let config = DigitSlotConfig::default().animation(EntryAnimation::Dissolve);
        let mut input = focused_input(&mut ctx, config);

        type_str(&mut input, &mut ctx, "3");
        assert_eq!(input.slots(&ctx)[0].opacity(), 0.0);

        for _ in 0..30 {
            input.update(&mut ctx, 1.0 / 60.0);
        }
        let slot = &input.slots(&ctx)[0];
        assert!(!slot.is_animating());
        assert_eq!(slot.opacity(), 1.0);
    }

    #[test]
    fn test_new_animation_replaces_previous() {
        let mut ctx = WidgetContext::new();
        let config = DigitSlotConfig::default().animation(EntryAnimation::Spring);
        let mut input = focused_input(&mut ctx, config);

        // Delete and retype the same slot before the first reveal settles
        type_str(&mut input, &mut ctx, "1");
        input.update(&mut ctx, 1.0 / 60.0);
        input.handle_event(&mut ctx, &Event::key(KeyCode::BACKSPACE, Default::default()));
        type_str(&mut input, &mut ctx, "2");

        let slot = &input.slots(&ctx)[0];
        assert!(slot.is_animating());
        assert_eq!(slot.label(), Some('2'));
    }

    #[test]
    fn test_resize_event_relayouts() {
        let mut ctx = WidgetContext::new();
        let mut input = DigitSlotInput::with_config(&mut ctx, DigitSlotConfig::default());

        input.handle_event(&mut ctx, &Event::resize(400.0, 60.0));
        let g = input.geometry(&ctx);
        assert_eq!(g.container, Size::new(400.0, 60.0));
        assert!(g.cell.height > 0.0);
    }

    #[test]
    fn test_keyboard_hints_forwarded_to_proxy() {
        let mut ctx = WidgetContext::new();
        let mut input = DigitSlotInput::with_config(&mut ctx, DigitSlotConfig::default());

        let opts = KeyboardOptions {
            keyboard_type: KeyboardType::AsciiCapable,
            appearance: KeyboardAppearance::Dark,
            content_type: ContentTypeHint::Password,
        };
        input.set_keyboard(&mut ctx, opts);

        let state = ctx.get_widget_state::<DigitSlotState>(input.id()).unwrap();
        assert_eq!(state.proxy().keyboard(), opts);
    }

    #[test]
    fn test_underline_color_change_rebuilds_and_keeps_value() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());

        type_str(&mut input, &mut ctx, "12");
        input.set_underline_color(&mut ctx, Color::RED);

        assert_eq!(input.text(&ctx), "12");
        assert_eq!(
            labels(&input, &ctx),
            vec![Some('1'), Some('2'), None, None]
        );
        assert_eq!(input.slots(&ctx)[0].underline_color(), Color::RED);
        assert_eq!(highlighted_indices(&input, &ctx), vec![2]);
    }

    #[test]
    fn test_accepted_edits_mark_dirty() {
        let mut ctx = WidgetContext::new();
        let mut input = focused_input(&mut ctx, DigitSlotConfig::default());
        ctx.clear_dirty();

        type_str(&mut input, &mut ctx, "1");
        assert!(ctx.is_dirty(input.id()));
    }

    #[test]
    fn test_resolve_edit() {
        assert_eq!(resolve_edit("", 0..0, "1"), "1");
        assert_eq!(resolve_edit("12", 2..2, "3"), "123");
        assert_eq!(resolve_edit("123", 2..3, ""), "12");
        assert_eq!(resolve_edit("123", 0..1, "9"), "923");
        // Out-of-range indices clamp instead of panicking
        assert_eq!(resolve_edit("12", 5..9, "3"), "123");
    }
}
