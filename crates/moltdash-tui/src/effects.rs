//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer only mutates state and returns effects; it never performs
//! I/O or spawns tasks directly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Post the suggestion box contents.
    SubmitSuggestion { text: String },

    /// Drop the current subscription and connect again immediately.
    Reconnect,
}
