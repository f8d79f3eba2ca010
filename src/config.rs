//! Configuration handling for taskdeck
//!
//! One value of record: the service base URL. Stored in
//! `~/.config/taskdeck/config.toml`; overridable per invocation with
//! `--api-url` or `TASKDECK_API_URL` (flag wins over the environment,
//! both win over the file).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.taskdeck.dev";

/// Environment variable read by the `--api-url` flag
pub const API_URL_ENV: &str = "TASKDECK_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the task service
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location
    ///
    /// A missing file means defaults; an unreadable or malformed file
    /// is an error.
    pub fn load() -> Result<Self> {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }

    /// Returns the global config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskdeck", "taskdeck").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Saves the configuration
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))
    }

    /// Applies a flag-level override (the flag already folds in the
    /// environment variable)
    pub fn api_url_with_override(&self, override_url: Option<&str>) -> String {
        match override_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.api_url.clone(),
        }
    }
}
