//! Suggestion submission.

use tracing::{info, warn};

use crate::client::DashboardClient;

/// Result of one submission attempt. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// Input was blank; no request was sent.
    Skipped,
    Accepted,
    /// Server answered `success: false`.
    Rejected(Option<String>),
    /// Transport or protocol failure.
    Failed(String),
}

impl SuggestionOutcome {
    /// Whether the input box should be cleared.
    pub fn clears_input(&self) -> bool {
        matches!(self, SuggestionOutcome::Accepted)
    }
}

/// Trims `raw` and posts it unless blank. Failures are logged, never raised.
pub async fn submit_suggestion(client: &DashboardClient, raw: &str) -> SuggestionOutcome {
    let text = raw.trim();
    if text.is_empty() {
        return SuggestionOutcome::Skipped;
    }

    match client.submit_suggestion(text).await {
        Ok(receipt) if receipt.success => {
            info!(chars = text.chars().count(), "Suggestion submitted");
            SuggestionOutcome::Accepted
        }
        Ok(receipt) => {
            warn!(error = ?receipt.error, "Suggestion rejected by server");
            SuggestionOutcome::Rejected(receipt.error)
        }
        Err(err) => {
            warn!(error = %err, "Failed to submit suggestion");
            SuggestionOutcome::Failed(err.to_string())
        }
    }
}
