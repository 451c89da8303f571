//! Runtime execution modes.
//!
//! - `tail`: line-oriented activity output (stdout/stderr)
//! - `dashboard`: full-screen terminal UI (optional feature)

pub mod tail;

#[cfg(feature = "tui")]
pub use moltdash_tui::run_dashboard;

#[cfg(not(feature = "tui"))]
pub async fn run_dashboard(
    _config: moltdash_core::config::Config,
    _client: moltdash_core::client::DashboardClient,
) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\"). Use `moltdash tail`.");
}
