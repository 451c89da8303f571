//! CLI command handlers.

pub mod config;
pub mod dashboard;
pub mod status;
pub mod suggest;
pub mod tail;

use anyhow::{Context, Result};
use moltdash_core::client::DashboardClient;
use moltdash_core::config::Config;

/// Builds the HTTP client for the configured server.
pub fn client(config: &Config) -> Result<DashboardClient> {
    DashboardClient::new(&config.base_url, config.request_timeout())
        .with_context(|| format!("create client for {}", config.base_url))
}
