//! HTTP client for the dashboard server.

pub mod sse;

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::client::sse::ActivitySseParser;
use crate::core::events::{ActivityEvent, now_secs};
use crate::core::status::StatusSnapshot;

pub const USER_AGENT: &str = concat!("moltdash/", env!("CARGO_PKG_VERSION"));

const STATUS_PATH: &str = "/api/status";
const STREAM_PATH: &str = "/api/activity/stream";
const RECENT_PATH: &str = "/api/activity/recent";
const SUGGESTIONS_PATH: &str = "/api/suggestions";

/// Category of a client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardErrorKind {
    /// Connection refused, reset, DNS failure, invalid URL.
    Transport,
    /// Request or connect timeout.
    Timeout,
    /// Non-2xx response.
    HttpStatus,
    /// Body could not be decoded.
    Parse,
    /// The activity stream ended.
    Closed,
}

impl fmt::Display for DashboardErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardErrorKind::Transport => write!(f, "transport"),
            DashboardErrorKind::Timeout => write!(f, "timeout"),
            DashboardErrorKind::HttpStatus => write!(f, "http_status"),
            DashboardErrorKind::Parse => write!(f, "parse"),
            DashboardErrorKind::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardError {
    pub kind: DashboardErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    pub status: Option<u16>,
}

impl DashboardError {
    pub fn new(kind: DashboardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Creates an HTTP status error, lifting `error` out of a JSON body when
    /// the server sent one.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(|json| json.get("error"))
            .and_then(Value::as_str)
        {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: DashboardErrorKind::HttpStatus,
            message,
            status: Some(status),
        }
    }

    pub fn closed() -> Self {
        Self::new(DashboardErrorKind::Closed, "Activity stream closed by server")
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DashboardError {}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

/// Raw `data` payloads of one open activity subscription.
pub type ActivityStream = Pin<Box<dyn Stream<Item = DashboardResult<String>> + Send>>;

/// Server reply to a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestionReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// A suggestion the bot has not picked up yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PendingSuggestion {
    #[serde(default)]
    pub id: u64,
    pub text: String,
    /// Seconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

#[derive(Deserialize)]
struct PendingSuggestionsResponse {
    #[serde(default)]
    suggestions: Vec<PendingSuggestion>,
}

#[derive(Deserialize)]
struct RecentActivityResponse {
    #[serde(default)]
    activities: Vec<Value>,
}

/// Client for the dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl DashboardClient {
    /// Creates a client for `base_url`.
    ///
    /// `request_timeout` bounds the one-shot requests and the stream's
    /// connect phase; an open stream is never timed out.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> DashboardResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DashboardError::new(
                DashboardErrorKind::Transport,
                format!("Invalid base URL '{base_url}': {e}"),
            )
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| classify_reqwest_error(&e))?;
        Ok(Self {
            http,
            base_url,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Fetches the current status snapshot.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx, or an undecodable body.
    pub async fn status(&self) -> DashboardResult<StatusSnapshot> {
        let body = self.get_text(STATUS_PATH).await?;
        serde_json::from_str(&body).map_err(|e| {
            DashboardError::new(
                DashboardErrorKind::Parse,
                format!("Failed to parse status: {e}"),
            )
        })
    }

    /// Fetches recently recorded events, oldest first.
    ///
    /// Entries that are not valid events are skipped.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx, or an undecodable body.
    pub async fn recent_activity(&self) -> DashboardResult<Vec<ActivityEvent>> {
        let body = self.get_text(RECENT_PATH).await?;
        let response: RecentActivityResponse = serde_json::from_str(&body).map_err(|e| {
            DashboardError::new(
                DashboardErrorKind::Parse,
                format!("Failed to parse recent activity: {e}"),
            )
        })?;

        let received_at = now_secs();
        let events = response
            .activities
            .into_iter()
            .filter_map(|value| match ActivityEvent::from_value(value, received_at) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(error = %err, "Skipping malformed recent activity entry");
                    None
                }
            })
            .collect();
        Ok(events)
    }

    /// Posts a suggestion.
    ///
    /// A rejection with a JSON body (e.g. HTTP 400 for empty text) is
    /// returned as a receipt with `success == false`.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-2xx without a receipt body.
    pub async fn submit_suggestion(&self, text: &str) -> DashboardResult<SuggestionReceipt> {
        let response = self
            .http
            .post(self.endpoint(SUGGESTIONS_PATH))
            .timeout(self.request_timeout)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return match serde_json::from_str::<SuggestionReceipt>(&body) {
                Ok(receipt) if !receipt.success => Ok(receipt),
                _ => Err(DashboardError::http_status(status.as_u16(), &body)),
            };
        }
        serde_json::from_str(&body).map_err(|e| {
            DashboardError::new(
                DashboardErrorKind::Parse,
                format!("Failed to parse suggestion response: {e}"),
            )
        })
    }

    /// Lists suggestions still waiting for the bot, oldest first.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx, or an undecodable body.
    pub async fn pending_suggestions(&self) -> DashboardResult<Vec<PendingSuggestion>> {
        let body = self.get_text(SUGGESTIONS_PATH).await?;
        let response: PendingSuggestionsResponse = serde_json::from_str(&body).map_err(|e| {
            DashboardError::new(
                DashboardErrorKind::Parse,
                format!("Failed to parse pending suggestions: {e}"),
            )
        })?;
        Ok(response.suggestions)
    }

    /// Opens the activity subscription.
    ///
    /// # Errors
    /// Returns an error if the request fails or the server answers non-2xx.
    pub async fn open_activity_stream(&self) -> DashboardResult<ActivityStream> {
        let url = self.endpoint(STREAM_PATH);
        debug!(%url, "Opening activity stream");
        let response = tokio::time::timeout(
            self.request_timeout,
            self.http
                .get(&url)
                .header("accept", "text/event-stream")
                .header("cache-control", "no-cache")
                .send(),
        )
        .await
        .map_err(|_| {
            DashboardError::new(
                DashboardErrorKind::Timeout,
                format!("Timed out opening {url}"),
            )
        })?
        .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::http_status(status.as_u16(), &body));
        }

        let bytes: Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>> =
            Box::pin(response.bytes_stream());
        Ok(Box::pin(ActivitySseParser::new(bytes)))
    }

    async fn get_text(&self, path: &str) -> DashboardResult<String> {
        let response = self
            .http
            .get(self.endpoint(path))
            .timeout(self.request_timeout)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        if !status.is_success() {
            return Err(DashboardError::http_status(status.as_u16(), &body));
        }
        Ok(body)
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> DashboardError {
    if e.is_timeout() {
        DashboardError::new(DashboardErrorKind::Timeout, format!("Request timed out: {e}"))
    } else if e.is_connect() {
        DashboardError::new(
            DashboardErrorKind::Transport,
            format!("Connection failed: {e}"),
        )
    } else if e.is_decode() {
        DashboardError::new(DashboardErrorKind::Parse, format!("Decode error: {e}"))
    } else {
        DashboardError::new(DashboardErrorKind::Transport, format!("Network error: {e}"))
    }
}
