//! Full-screen dashboard command.

use anyhow::Result;
use moltdash_core::config::Config;
use tracing::info;

use crate::modes;

pub async fn run(config: Config) -> Result<()> {
    let client = super::client(&config)?;
    info!(base_url = %config.base_url, "Starting dashboard");
    modes::run_dashboard(config, client).await
}
