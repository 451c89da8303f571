//! UI events consumed by the reducer.

use crossterm::event::Event;
use moltdash_core::core::session::SessionEvent;
use moltdash_core::suggestions::SuggestionOutcome;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Render cadence tick.
    Tick,
    /// Current terminal size, prepended to every batch of events.
    Frame { width: u16, height: u16 },
    Terminal(Event),
    /// Message from the stream supervisor or the status poller.
    Session(SessionEvent),
    SuggestionSubmitted(SuggestionOutcome),
}
