//! Widget identity

use slotmap::new_key_type;

new_key_type! {
    /// Generational key identifying a widget registered in a
    /// [`crate::context::WidgetContext`]
    pub struct WidgetId;
}

/// Minimal capability shared by all widgets
pub trait Widget {
    /// The widget's id in its context
    fn id(&self) -> WidgetId;
}
