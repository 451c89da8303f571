//! Suggest command.

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use moltdash_core::client::PendingSuggestion;
use moltdash_core::config::Config;
use moltdash_core::core::events::now_secs;
use moltdash_core::core::relative_time::format_relative;
use moltdash_core::suggestions::{SuggestionOutcome, submit_suggestion};

pub async fn run(config: &Config, text: &str) -> Result<()> {
    let client = super::client(config)?;
    match submit_suggestion(&client, text).await {
        SuggestionOutcome::Accepted => {
            println!("Suggestion sent to {}", config.agent_name);
            Ok(())
        }
        SuggestionOutcome::Skipped => anyhow::bail!("Suggestion text is empty"),
        SuggestionOutcome::Rejected(Some(reason)) => {
            anyhow::bail!("Suggestion rejected: {reason}")
        }
        SuggestionOutcome::Rejected(None) => anyhow::bail!("Suggestion rejected"),
        SuggestionOutcome::Failed(error) => anyhow::bail!("Suggestion failed: {error}"),
    }
}

pub async fn list(config: &Config) -> Result<()> {
    let client = super::client(config)?;
    let pending = client
        .pending_suggestions()
        .await
        .with_context(|| format!("fetch suggestions from {}", config.base_url))?;

    if pending.is_empty() {
        println!("No pending suggestions");
    } else {
        println!("{}", pending_table(&pending, now_secs()));
    }
    Ok(())
}

fn pending_table(pending: &[PendingSuggestion], now: f64) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Age", "Suggestion"]);
    for suggestion in pending {
        let age = suggestion
            .timestamp
            .map_or_else(|| "?".to_string(), |at| format_relative(at, now));
        table.add_row(vec![age, suggestion.text.clone()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_table_lists_age_and_text() {
        let pending = vec![
            PendingSuggestion {
                id: 1,
                text: "post about rust".to_string(),
                timestamp: Some(1_000.0),
            },
            PendingSuggestion {
                id: 2,
                text: "reply to crabs".to_string(),
                timestamp: None,
            },
        ];
        let rendered = pending_table(&pending, 1_125.0).to_string();
        assert!(rendered.contains("2m"));
        assert!(rendered.contains("post about rust"));
        assert!(rendered.contains("reply to crabs"));
    }
}
