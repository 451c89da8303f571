//! Activity events reported by the agent.
//!
//! One event is one unit of agent behaviour (a post, a vote, a thought
//! fragment). Events arrive as JSON over the push subscription or in bulk
//! from the recent-activity endpoint.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Kind of an activity event.
///
/// Unrecognized wire names are preserved in `Unknown` so they can still be
/// rendered with a generic card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Thinking,
    Thought,
    ThoughtChunk,
    GetFeed,
    ReadPost,
    PostCreated,
    CommentCreated,
    Upvote,
    Downvote,
    Search,
    RateLimit,
    Error,
    SuggestionReceived,
    UserResponse,
    Follow,
    Connected,
    Unknown(String),
}

impl ActivityKind {
    pub fn from_wire(name: &str) -> Self {
        match name {
            "thinking" => ActivityKind::Thinking,
            "thought" => ActivityKind::Thought,
            "thought_chunk" => ActivityKind::ThoughtChunk,
            "get_feed" => ActivityKind::GetFeed,
            "read_post" => ActivityKind::ReadPost,
            "post_created" => ActivityKind::PostCreated,
            "comment_created" => ActivityKind::CommentCreated,
            "upvote" => ActivityKind::Upvote,
            "downvote" => ActivityKind::Downvote,
            "search" => ActivityKind::Search,
            "rate_limit" => ActivityKind::RateLimit,
            "error" => ActivityKind::Error,
            "suggestion_received" => ActivityKind::SuggestionReceived,
            "user_response" => ActivityKind::UserResponse,
            "follow" => ActivityKind::Follow,
            "connected" => ActivityKind::Connected,
            other => ActivityKind::Unknown(other.to_string()),
        }
    }

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::Thinking => "thinking",
            ActivityKind::Thought => "thought",
            ActivityKind::ThoughtChunk => "thought_chunk",
            ActivityKind::GetFeed => "get_feed",
            ActivityKind::ReadPost => "read_post",
            ActivityKind::PostCreated => "post_created",
            ActivityKind::CommentCreated => "comment_created",
            ActivityKind::Upvote => "upvote",
            ActivityKind::Downvote => "downvote",
            ActivityKind::Search => "search",
            ActivityKind::RateLimit => "rate_limit",
            ActivityKind::Error => "error",
            ActivityKind::SuggestionReceived => "suggestion_received",
            ActivityKind::UserResponse => "user_response",
            ActivityKind::Follow => "follow",
            ActivityKind::Connected => "connected",
            ActivityKind::Unknown(name) => name,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single activity event.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    /// Free-form fields, interpreted per kind by the card formatter.
    pub details: Map<String, Value>,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

/// Wire shape of an event.
///
/// `details` and `timestamp` are optional: the server's stream handshake is
/// `{"type":"connected","message":...}`, so any leftover top-level fields
/// stand in for the details.
#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    details: Option<Map<String, Value>>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl WireEvent {
    fn into_event(self, received_at: f64) -> ActivityEvent {
        ActivityEvent {
            kind: ActivityKind::from_wire(&self.kind),
            details: self.details.unwrap_or(self.rest),
            timestamp: self.timestamp.unwrap_or(received_at),
        }
    }
}

impl ActivityEvent {
    /// Creates an event with the given kind and details.
    pub fn new(kind: ActivityKind, details: Map<String, Value>, timestamp: f64) -> Self {
        Self {
            kind,
            details,
            timestamp,
        }
    }

    /// Parses a raw stream payload.
    ///
    /// `received_at` is used when the payload carries no timestamp.
    ///
    /// # Errors
    /// Returns an error if the payload is not a JSON event object.
    pub fn parse(raw: &str, received_at: f64) -> serde_json::Result<Self> {
        let wire: WireEvent = serde_json::from_str(raw.trim())?;
        Ok(wire.into_event(received_at))
    }

    /// Converts an already-decoded JSON value (e.g. from the recent-activity list).
    ///
    /// # Errors
    /// Returns an error if the value is not a JSON event object.
    pub fn from_value(value: Value, received_at: f64) -> serde_json::Result<Self> {
        let wire: WireEvent = serde_json::from_value(value)?;
        Ok(wire.into_event(received_at))
    }

    /// Returns a detail field as a trimmed, non-empty string.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        let value = self.details.get(key)?.as_str()?.trim();
        (!value.is_empty()).then_some(value)
    }

    /// Returns a detail field rendered as text (strings verbatim, numbers and
    /// booleans via their JSON form). `null` and missing fields yield `None`.
    pub fn detail_text(&self, key: &str) -> Option<String> {
        match self.details.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Returns the current wall-clock time as seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_full_event() {
        let raw = r#"{"type":"get_feed","details":{"count":12,"sort":"new"},"timestamp":1700000000.5}"#;
        let event = ActivityEvent::parse(raw, 0.0).unwrap();

        assert_eq!(event.kind, ActivityKind::GetFeed);
        assert_eq!(event.timestamp, 1_700_000_000.5);
        assert_eq!(event.detail_text("count").as_deref(), Some("12"));
        assert_eq!(event.detail_str("sort"), Some("new"));
    }

    #[test]
    fn test_parse_handshake_without_details() {
        let raw = r#"{"type":"connected","message":"Connected to activity stream"}"#;
        let event = ActivityEvent::parse(raw, 42.0).unwrap();

        assert_eq!(event.kind, ActivityKind::Connected);
        assert_eq!(event.timestamp, 42.0);
        assert_eq!(
            event.detail_str("message"),
            Some("Connected to activity stream")
        );
    }

    #[test]
    fn test_parse_unknown_kind_is_preserved() {
        let raw = r#"{"type":"karma_update","details":{"karma":7},"timestamp":1}"#;
        let event = ActivityEvent::parse(raw, 0.0).unwrap();

        assert_eq!(event.kind, ActivityKind::Unknown("karma_update".to_string()));
        assert_eq!(event.kind.as_str(), "karma_update");
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        assert!(ActivityEvent::parse("{not json", 0.0).is_err());
        assert!(ActivityEvent::parse(r#"{"details":{}}"#, 0.0).is_err());
        assert!(ActivityEvent::parse("42", 0.0).is_err());
    }

    #[test]
    fn test_detail_text_skips_null() {
        let value = json!({"type":"rate_limit","details":{"comments_remaining":null,"wait_seconds":12}});
        let event = ActivityEvent::from_value(value, 0.0).unwrap();

        assert_eq!(event.detail_text("comments_remaining"), None);
        assert_eq!(event.detail_text("wait_seconds").as_deref(), Some("12"));
    }

    #[test]
    fn test_kind_round_trips_wire_names() {
        for name in ["thinking", "thought_chunk", "suggestion_received", "follow"] {
            assert_eq!(ActivityKind::from_wire(name).as_str(), name);
        }
    }
}
