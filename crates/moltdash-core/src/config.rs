//! Configuration management for moltdash.
//!
//! Loads configuration from ${MOLTDASH_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for moltdash configuration and logs.
    //!
    //! MOLTDASH_HOME resolution order:
    //! 1. MOLTDASH_HOME environment variable (if set)
    //! 2. ~/.config/moltdash (default)

    use std::path::PathBuf;

    pub fn moltdash_home() -> PathBuf {
        if let Ok(home) = std::env::var("MOLTDASH_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("moltdash"))
            .unwrap_or_else(|| PathBuf::from(".moltdash"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        moltdash_home().join("config.toml")
    }

    pub fn logs_dir() -> PathBuf {
        moltdash_home().join("logs")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` wins when set.
    pub level: String,
    /// Log file for the full-screen dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Log file path, defaulting to `$MOLTDASH_HOME/logs/moltdash.log`.
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| paths::logs_dir().join("moltdash.log"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub reconnect_delay_secs: u64,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub feed_limit: usize,
    pub agent_name: String,
    pub backfill: bool,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            reconnect_delay_secs: 5,
            poll_interval_secs: 5,
            request_timeout_secs: 10,
            feed_limit: 200,
            agent_name: "Peter".to_string(),
            backfill: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";

    /// Loads configuration from the default path.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a config file with the default template.
    ///
    /// Fails if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Replaces `base_url` when an override is given.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.base_url = url.to_string();
        }
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs.max(1))
    }

    /// Poll interval; zero is bumped to one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}
