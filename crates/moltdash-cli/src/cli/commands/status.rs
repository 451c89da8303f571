//! Status command: one snapshot, printed as a table.

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use moltdash_core::config::Config;
use moltdash_core::core::events::now_secs;
use moltdash_core::core::relative_time::format_relative;
use moltdash_core::core::status::{RateLimitTier, StatusSnapshot, StatusView};

pub async fn run(config: &Config, json: bool) -> Result<()> {
    let client = super::client(config)?;
    let snapshot = client
        .status()
        .await
        .with_context(|| format!("fetch status from {}", config.base_url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", status_table(&snapshot, now_secs()));
    }
    Ok(())
}

fn tier_note(tier: RateLimitTier) -> &'static str {
    match tier {
        RateLimitTier::Normal => "",
        RateLimitTier::Warning => " (low)",
        RateLimitTier::Reached => " (limit reached)",
    }
}

pub fn status_table(snapshot: &StatusSnapshot, now: f64) -> Table {
    let view = StatusView::from_snapshot(snapshot);
    let comments = &view.comments;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    let running = if view.running { "yes" } else { "no" };
    table.add_row(vec!["Running".to_string(), running.to_string()]);
    table.add_row(vec!["Uptime".to_string(), view.uptime.to_string()]);
    table.add_row(vec!["Actions".to_string(), view.total_actions.to_string()]);
    if let Some(ok) = view.successful_actions {
        table.add_row(vec!["Successful".to_string(), ok.to_string()]);
    }
    table.add_row(vec![
        "Success rate".to_string(),
        format!("{}%", view.success_rate),
    ]);
    let last = view.last_activity.map_or_else(
        || "never".to_string(),
        |at| format!("{} ago", format_relative(at, now)),
    );
    table.add_row(vec!["Last activity".to_string(), last]);
    table.add_row(vec![
        "Comments".to_string(),
        format!(
            "{}/{} ({:.0}%), {} left{}",
            comments.used,
            comments.limit,
            comments.percent,
            comments.remaining,
            tier_note(comments.tier)
        ),
    ]);
    table.add_row(vec![
        "Next comment".to_string(),
        comments.next_available.clone(),
    ]);
    let posts = if view.posts.warning {
        format!("wait, next {}", view.posts.next_available)
    } else {
        "ready".to_string()
    };
    table.add_row(vec!["Posts".to_string(), posts]);
    if let Some(reset) = &snapshot.rate_limits.reset_date {
        table.add_row(vec!["Limits reset".to_string(), reset.clone()]);
    }
    table
}
