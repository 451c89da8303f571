//! Application state.
//!
//! ```text
//! AppState
//! ├── session: Session        (connection, feed, counters, status view)
//! ├── scroll: ScrollState     (feed follow / anchored position)
//! ├── input: InputState       (suggestion box)
//! └── notice: Option<Notice>  (transient footer message)
//! ```

use std::time::{Duration, Instant};

use moltdash_core::config::Config;
use moltdash_core::core::session::Session;

use crate::features::feed::ScrollState;
use crate::features::input::InputState;

/// How long a footer notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    Info,
    Error,
}

/// Transient message shown in the footer.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub tone: NoticeTone,
    pub shown_at: Instant,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: NoticeTone::Info,
            shown_at: Instant::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: NoticeTone::Error,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= NOTICE_TTL
    }
}

pub struct AppState {
    pub session: Session,
    pub scroll: ScrollState,
    pub input: InputState,
    pub notice: Option<Notice>,
    pub base_url: String,
    pub should_quit: bool,
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(config.agent_name.clone(), config.feed_limit),
            scroll: ScrollState::default(),
            input: InputState::default(),
            notice: None,
            base_url: config.base_url.clone(),
            should_quit: false,
            spinner_frame: 0,
        }
    }
}
