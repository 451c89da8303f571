//! Full-screen activity dashboard.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::Result;
use moltdash_core::client::DashboardClient;
use moltdash_core::config::Config;
pub use runtime::TuiRuntime;

/// Runs the dashboard until the user quits.
///
/// # Errors
/// Returns an error if stdout is not a terminal or the terminal cannot be
/// set up.
pub async fn run_dashboard(config: Config, client: DashboardClient) -> Result<()> {
    if !stdout().is_terminal() || !stderr().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `moltdash tail` to print activity as plain lines."
        );
    }

    let mut err = stderr();
    writeln!(err, "moltdash")?;
    writeln!(err, "Server: {}", client.base_url())?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(config, client)?;
    let result = runtime.run();
    drop(runtime);
    result?;

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
