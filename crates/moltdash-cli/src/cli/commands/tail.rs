//! Tail command.

use anyhow::Result;
use moltdash_core::config::Config;

use crate::modes;

pub async fn run(config: &Config) -> Result<()> {
    let client = super::client(config)?;
    modes::tail::run(config, client).await
}
