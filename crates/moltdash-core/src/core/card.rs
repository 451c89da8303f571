//! Feed cards: the rendered form of an activity event.
//!
//! Each event kind maps to a fixed icon, a fixed label and a kind-specific
//! content formatter. Formatting never fails; missing detail fields fall
//! back to defaults so a sparse event still produces a card.

use crate::core::events::{ActivityEvent, ActivityKind};

/// Max characters of a post title shown on vote cards.
pub const VOTE_TITLE_MAX_CHARS: usize = 80;

/// Icon used for kinds without a dedicated mapping.
pub const FALLBACK_ICON: &str = "•";

/// Stable identifier of a card within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u64);

/// Visual tone of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardTone {
    #[default]
    Normal,
    /// Flagged as an error (red accent).
    Error,
}

/// A run of card text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub strong: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: false,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: true,
        }
    }
}

/// Card body as a list of segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardContent {
    pub segments: Vec<Segment>,
}

impl CardContent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::plain(text)],
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Concatenated text without emphasis.
    pub fn to_plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A rendered feed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub kind: ActivityKind,
    pub icon: &'static str,
    pub label: String,
    pub content: CardContent,
    pub tone: CardTone,
    /// Event timestamp (seconds since epoch); relative time is derived at render.
    pub timestamp: f64,
    /// True while this card is the in-progress streaming thought.
    pub streaming: bool,
}

/// Icon, label, content and tone for an event, before it gets an id.
#[derive(Debug, Clone, PartialEq)]
pub struct CardTemplate {
    pub icon: &'static str,
    pub label: String,
    pub content: CardContent,
    pub tone: CardTone,
}

impl CardTemplate {
    pub fn into_card(self, id: CardId, event: &ActivityEvent) -> Card {
        Card {
            id,
            kind: event.kind.clone(),
            icon: self.icon,
            label: self.label,
            content: self.content,
            tone: self.tone,
            timestamp: event.timestamp,
            streaming: false,
        }
    }
}

/// Returns the fixed icon for a kind.
pub fn icon_for(kind: &ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Thinking => "🤔",
        ActivityKind::Thought | ActivityKind::ThoughtChunk => "💭",
        ActivityKind::GetFeed => "📰",
        ActivityKind::ReadPost => "📖",
        ActivityKind::PostCreated => "✍️",
        ActivityKind::CommentCreated => "💬",
        ActivityKind::Upvote => "👍",
        ActivityKind::Downvote => "👎",
        ActivityKind::Search => "🔍",
        ActivityKind::RateLimit => "⏳",
        ActivityKind::Error => "❌",
        ActivityKind::SuggestionReceived => "💡",
        ActivityKind::UserResponse => "🗨️",
        ActivityKind::Follow => "➕",
        ActivityKind::Connected => "🔌",
        ActivityKind::Unknown(_) => FALLBACK_ICON,
    }
}

/// Returns the fixed label for a kind.
pub fn label_for(kind: &ActivityKind) -> String {
    let label = match kind {
        ActivityKind::Thinking | ActivityKind::ThoughtChunk => "THINKING",
        ActivityKind::Thought => "THOUGHT",
        ActivityKind::GetFeed => "FEED",
        ActivityKind::ReadPost => "READ",
        ActivityKind::PostCreated => "POST",
        ActivityKind::CommentCreated => "COMMENT",
        ActivityKind::Upvote => "UPVOTE",
        ActivityKind::Downvote => "DOWNVOTE",
        ActivityKind::Search => "SEARCH",
        ActivityKind::RateLimit => "RATE LIMIT",
        ActivityKind::Error => "ERROR",
        ActivityKind::SuggestionReceived => "SUGGESTION",
        ActivityKind::UserResponse => "RESPONSE",
        ActivityKind::Follow => "FOLLOW",
        ActivityKind::Connected => "CONNECTED",
        ActivityKind::Unknown(name) => return name.to_uppercase(),
    };
    label.to_string()
}

/// Builds the card template for an event.
pub fn template_for(event: &ActivityEvent, agent_name: &str) -> CardTemplate {
    let tone = if event.kind == ActivityKind::Error {
        CardTone::Error
    } else {
        CardTone::Normal
    };
    CardTemplate {
        icon: icon_for(&event.kind),
        label: label_for(&event.kind),
        content: format_content(event, agent_name),
        tone,
    }
}

/// Text carried by a `thought_chunk` event: the accumulated thought when
/// present, else the raw chunk.
pub fn chunk_text(event: &ActivityEvent) -> String {
    event
        .detail_text("accumulated")
        .or_else(|| event.detail_text("chunk"))
        .unwrap_or_default()
}

fn format_content(event: &ActivityEvent, agent_name: &str) -> CardContent {
    let text = |key: &str| event.detail_text(key).unwrap_or_default();

    match &event.kind {
        ActivityKind::Thinking => CardContent::plain(format!("{agent_name} is thinking...")),
        ActivityKind::Thought | ActivityKind::CommentCreated => CardContent::plain(text("content")),
        ActivityKind::ThoughtChunk => CardContent::plain(chunk_text(event)),
        ActivityKind::GetFeed => {
            let count = event.detail_text("count").unwrap_or_else(|| "0".to_string());
            let sort = event.detail_str("sort").unwrap_or("hot");
            CardContent::plain(format!("Fetched {count} posts ({sort})"))
        }
        ActivityKind::ReadPost => CardContent::from_segments(vec![Segment::strong(text("title"))]),
        ActivityKind::PostCreated => {
            let mut segments = vec![Segment::strong(text("title"))];
            if let Some(submolt) = event.detail_str("submolt") {
                segments.push(Segment::plain(format!(" in m/{submolt}")));
            }
            CardContent::from_segments(segments)
        }
        ActivityKind::Upvote | ActivityKind::Downvote => {
            let title = event.detail_str("title").map_or_else(
                || "a post".to_string(),
                |title| title.chars().take(VOTE_TITLE_MAX_CHARS).collect(),
            );
            CardContent::plain(title)
        }
        ActivityKind::Search => CardContent::plain(format!("\"{}\"", text("query"))),
        ActivityKind::RateLimit => CardContent::plain(format_rate_limit(event)),
        ActivityKind::Error => CardContent::plain(
            event
                .detail_text("error")
                .or_else(|| event.detail_text("message"))
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        ActivityKind::SuggestionReceived => CardContent::plain(text("text")),
        ActivityKind::UserResponse => {
            CardContent::plain(format!("{agent_name}: {}", text("message")))
        }
        ActivityKind::Follow => CardContent::plain(format!("Followed {}", text("agent_name"))),
        ActivityKind::Connected => CardContent::plain(
            event
                .detail_text("message")
                .unwrap_or_else(|| "Connected to activity stream".to_string()),
        ),
        ActivityKind::Unknown(_) => CardContent::plain(
            serde_json::to_string(&event.details).unwrap_or_else(|_| "{}".to_string()),
        ),
    }
}

/// Rate-limit message plus the remaining comment count when known, else the
/// next-available time.
fn format_rate_limit(event: &ActivityEvent) -> String {
    let message = event
        .detail_text("message")
        .unwrap_or_else(|| "Rate limit reached".to_string());

    if let Some(remaining) = event.detail_text("comments_remaining") {
        return format!("{message} ({remaining} comments left)");
    }

    let next = event
        .detail_text("next_available")
        .or_else(|| event.detail_text("wait_until"))
        .or_else(|| event.detail_text("wait_seconds").map(|s| format!("{s}s")))
        .or_else(|| event.detail_text("wait_minutes").map(|m| format!("{m}m")));

    match next {
        Some(next) => format!("{message} (next: {next})"),
        None => message,
    }
}
