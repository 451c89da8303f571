//! Client-side session state.
//!
//! The stream supervisor and the status poller never touch state directly.
//! They send [`SessionEvent`]s into the inbox and whoever owns the
//! [`Session`] (the TUI runtime or the `tail` printer) applies them in
//! arrival order through [`Session::apply`].

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::card::{Card, CardContent, CardId, chunk_text, template_for};
use crate::core::events::{ActivityEvent, ActivityKind};
use crate::core::status::{StatusSnapshot, StatusView};

/// Default maximum number of cards kept in the feed.
pub const DEFAULT_FEED_LIMIT: usize = 200;

/// Connection indicator shared by the stream and the poller.
///
/// Last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Running,
    Error,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Idle => "Idle",
            ConnectionState::Running => "Running",
            ConnectionState::Error => "Error",
        }
    }
}

/// Messages from the stream supervisor.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamSignal {
    /// The subscription opened.
    Connected,
    /// One raw `data:` payload.
    Payload(String),
    /// The subscription failed or ended.
    Disconnected { error: String },
    /// The supervisor will retry after `delay`.
    Reconnecting { delay: Duration },
}

/// Result of one status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Snapshot(StatusSnapshot),
    Failed(String),
    /// Number of suggestions the bot has not picked up yet.
    PendingSuggestions(usize),
}

/// Everything that can be delivered to the session inbox.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Stream(StreamSignal),
    Poll(PollOutcome),
    /// Recent events fetched at startup, oldest first.
    Backfill(Vec<ActivityEvent>),
}

/// What changed as a result of applying a [`SessionEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    CardAdded(CardId),
    /// Content of the streaming card was replaced.
    CardUpdated(CardId),
    /// The streaming card stopped streaming.
    CardFinalized(CardId),
    /// Oldest cards dropped to respect the feed limit.
    CardsEvicted(usize),
    ConnectionChanged(ConnectionState),
    PayloadDropped,
    StatusUpdated,
    PendingSuggestionsUpdated(usize),
    Reconnecting(Duration),
}

/// Room for the streaming card plus the newest finished one.
const MIN_FEED_LIMIT: usize = 2;

/// Ordered, bounded list of cards.
#[derive(Debug, Clone)]
pub struct Feed {
    cards: VecDeque<Card>,
    next_id: u64,
    streaming: Option<CardId>,
    limit: usize,
}

impl Feed {
    pub fn new(limit: usize) -> Self {
        Self {
            cards: VecDeque::new(),
            next_id: 0,
            streaming: None,
            limit: limit.max(MIN_FEED_LIMIT),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Card> + ExactSizeIterator {
        self.cards.iter()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    /// The in-progress streaming card, if any.
    pub fn streaming(&self) -> Option<&Card> {
        self.streaming.and_then(|id| self.get(id))
    }

    pub fn newest(&self) -> Option<&Card> {
        self.cards.back()
    }

    fn next_id(&mut self) -> CardId {
        let id = CardId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a card and returns how many old cards were evicted.
    ///
    /// Neither the streaming card nor the card being pushed is evicted.
    fn push(&mut self, card: Card) -> usize {
        let pushed = card.id;
        self.cards.push_back(card);
        let mut evicted = 0;
        while self.cards.len() > self.limit {
            let streaming = self.streaming;
            let Some(index) = self
                .cards
                .iter()
                .position(|c| c.id != pushed && Some(c.id) != streaming)
            else {
                break;
            };
            self.cards.remove(index);
            evicted += 1;
        }
        evicted
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_LIMIT)
    }
}

/// Session state: connection, feed, counters and the latest status view.
#[derive(Debug, Clone)]
pub struct Session {
    pub connection: ConnectionState,
    pub feed: Feed,
    pub status: Option<StatusView>,
    /// Unset until the first successful suggestions poll.
    pub pending_suggestions: Option<usize>,
    /// Rendered events, excluding the streaming card.
    pub event_count: u64,
    /// Payloads discarded because they failed to parse.
    pub dropped_payloads: u64,
    /// Last transport or poll error.
    pub last_error: Option<String>,
    agent_name: String,
}

impl Session {
    pub fn new(agent_name: impl Into<String>, feed_limit: usize) -> Self {
        Self {
            connection: ConnectionState::Idle,
            feed: Feed::new(feed_limit),
            status: None,
            pending_suggestions: None,
            event_count: 0,
            dropped_payloads: 0,
            last_error: None,
            agent_name: agent_name.into(),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Applies one inbox message. `now` is used as the timestamp of payloads
    /// that carry none.
    pub fn apply(&mut self, event: SessionEvent, now: f64) -> Vec<SessionChange> {
        let mut changes = Vec::new();
        match event {
            SessionEvent::Stream(signal) => self.apply_stream(signal, now, &mut changes),
            SessionEvent::Poll(outcome) => self.apply_poll(outcome, &mut changes),
            SessionEvent::Backfill(events) => {
                debug!(count = events.len(), "Applying activity backfill");
                for event in events {
                    self.dispatch(event, &mut changes);
                }
            }
        }
        changes
    }

    fn apply_stream(&mut self, signal: StreamSignal, now: f64, changes: &mut Vec<SessionChange>) {
        match signal {
            StreamSignal::Connected => self.set_connection(ConnectionState::Running, changes),
            StreamSignal::Payload(raw) => match ActivityEvent::parse(&raw, now) {
                Ok(event) => self.dispatch(event, changes),
                Err(err) => {
                    warn!(error = %err, "Dropping malformed activity payload");
                    self.dropped_payloads += 1;
                    changes.push(SessionChange::PayloadDropped);
                }
            },
            StreamSignal::Disconnected { error } => {
                self.last_error = Some(error);
                self.set_connection(ConnectionState::Error, changes);
            }
            StreamSignal::Reconnecting { delay } => changes.push(SessionChange::Reconnecting(delay)),
        }
    }

    fn apply_poll(&mut self, outcome: PollOutcome, changes: &mut Vec<SessionChange>) {
        match outcome {
            PollOutcome::Snapshot(snapshot) => {
                self.status = Some(StatusView::from_snapshot(&snapshot));
                changes.push(SessionChange::StatusUpdated);
                if snapshot.running {
                    self.set_connection(ConnectionState::Running, changes);
                }
            }
            PollOutcome::Failed(error) => {
                self.last_error = Some(error);
                self.set_connection(ConnectionState::Error, changes);
            }
            PollOutcome::PendingSuggestions(count) => {
                self.pending_suggestions = Some(count);
                changes.push(SessionChange::PendingSuggestionsUpdated(count));
            }
        }
    }

    fn set_connection(&mut self, state: ConnectionState, changes: &mut Vec<SessionChange>) {
        if self.connection != state {
            self.connection = state;
            changes.push(SessionChange::ConnectionChanged(state));
        }
    }

    fn dispatch(&mut self, event: ActivityEvent, changes: &mut Vec<SessionChange>) {
        match event.kind {
            ActivityKind::ThoughtChunk => self.apply_chunk(&event, changes),
            ActivityKind::Thought if self.feed.streaming.is_some() => {
                if let Some(id) = self.feed.streaming.take() {
                    if let Some(card) = self.feed.get_mut(id) {
                        card.streaming = false;
                    }
                    changes.push(SessionChange::CardFinalized(id));
                }
            }
            _ => {
                let id = self.feed.next_id();
                let card = template_for(&event, &self.agent_name).into_card(id, &event);
                self.push_card(card, changes);
                self.event_count += 1;
            }
        }
    }

    fn apply_chunk(&mut self, event: &ActivityEvent, changes: &mut Vec<SessionChange>) {
        let text = chunk_text(event);
        if let Some(id) = self.feed.streaming
            && let Some(card) = self.feed.get_mut(id)
        {
            card.content = CardContent::plain(text);
            changes.push(SessionChange::CardUpdated(id));
            return;
        }

        let id = self.feed.next_id();
        let mut card = template_for(event, &self.agent_name).into_card(id, event);
        card.streaming = true;
        self.feed.streaming = Some(id);
        self.push_card(card, changes);
    }

    fn push_card(&mut self, card: Card, changes: &mut Vec<SessionChange>) {
        let id = card.id;
        let evicted = self.feed.push(card);
        changes.push(SessionChange::CardAdded(id));
        if evicted > 0 {
            changes.push(SessionChange::CardsEvicted(evicted));
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new("Peter", DEFAULT_FEED_LIMIT)
    }
}
