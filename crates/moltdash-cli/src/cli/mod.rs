//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use moltdash_core::config;
use moltdash_core::logging::{self, LogTarget};

mod commands;

#[derive(Parser)]
#[command(name = "moltdash")]
#[command(version)]
#[command(about = "Live activity dashboard for a social-network bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Dashboard server base URL (overrides config)
    #[arg(long, global = true, env = "MOLTDASH_URL", value_name = "URL")]
    url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print live activity as plain lines
    Tail,
    /// Show the current status and rate limits
    Status {
        /// Print the raw status JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a suggestion to the bot, or list the pending ones
    Suggest {
        /// List suggestions the bot has not picked up yet
        #[arg(long, conflicts_with = "text")]
        list: bool,

        /// Suggestion text
        #[arg(value_name = "TEXT", required_unless_present = "list", num_args = 1..)]
        text: Vec<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, url } = cli;

    if let Some(Commands::Config { command }) = &command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = config::Config::load()
        .context("load config")?
        .with_base_url(url.as_deref());

    // The dashboard owns the terminal, so it logs to a file.
    let target = match command {
        None => LogTarget::File(config.logging.file_path()),
        Some(_) => LogTarget::Stderr,
    };
    let _log_guard = logging::init(&config.logging, &target)?;

    // default to the full-screen dashboard
    let Some(command) = command else {
        return commands::dashboard::run(config).await;
    };

    match command {
        Commands::Tail => commands::tail::run(&config).await,
        Commands::Status { json } => commands::status::run(&config, json).await,
        Commands::Suggest { list: true, .. } => commands::suggest::list(&config).await,
        Commands::Suggest { text, .. } => commands::suggest::run(&config, &text.join(" ")).await,
        Commands::Config { .. } => Ok(()),
    }
}
