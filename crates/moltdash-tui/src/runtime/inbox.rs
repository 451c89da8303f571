//! Inbox channel types.
//!
//! Background tasks send their results here; the runtime drains the
//! receivers once per frame.

use moltdash_core::core::session::SessionEvent;
use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Stream supervisor and status poller output.
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;
