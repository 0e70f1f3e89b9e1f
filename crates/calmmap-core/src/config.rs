//! Configuration management for calmmap.
//!
//! Loads configuration from ${CALMMAP_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api_base_url`.
pub const API_BASE_ENV: &str = "CALMMAP_API_BASE";

/// Environment variable that overrides `log.filter`.
pub const LOG_FILTER_ENV: &str = "CALMMAP_LOG";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for calmmap configuration and data directories.
    //!
    //! CALMMAP_HOME resolution order:
    //! 1. CALMMAP_HOME environment variable (if set)
    //! 2. ~/.config/calmmap (default)
    //! 3. ./.calmmap when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the calmmap home directory.
    pub fn calmmap_home() -> PathBuf {
        if let Ok(home) = std::env::var("CALMMAP_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".calmmap"),
            |h| h.join(".config").join("calmmap"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        calmmap_home().join("config.toml")
    }

    /// Returns the path to the persisted credential file.
    pub fn credentials_path() -> PathBuf {
        calmmap_home().join("credentials.json")
    }

    /// Returns the directory that receives log files.
    pub fn log_dir() -> PathBuf {
        calmmap_home().join("logs")
    }
}

/// Dialog timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DialogConfig {
    /// Delay before the organization dialog closes after a fully successful submit.
    pub close_delay_ms: u64,
    /// Delay before the organization submit control is re-enabled.
    pub submit_reset_delay_ms: u64,
}

impl DialogConfig {
    pub const DEFAULT_CLOSE_DELAY_MS: u64 = 600;
    pub const DEFAULT_SUBMIT_RESET_DELAY_MS: u64 = 800;

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn submit_reset_delay(&self) -> Duration {
        Duration::from_millis(self.submit_reset_delay_ms)
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            close_delay_ms: Self::DEFAULT_CLOSE_DELAY_MS,
            submit_reset_delay_ms: Self::DEFAULT_SUBMIT_RESET_DELAY_MS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive (e.g. `info`, `calmmap_core=debug`).
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the listing API
    pub api_base_url: String,

    pub dialog: DialogConfig,

    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            dialog: DialogConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_API_BASE_URL: &'static str = "http://localhost:8080";

    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
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

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved value is not a valid URL.
    pub fn api_base_url(&self) -> Result<String> {
        let env_value = std::env::var(API_BASE_ENV).ok();
        resolve_base_url(env_value.as_deref(), &self.api_base_url)
    }

    /// Resolves the log filter with precedence: env > config.
    pub fn log_filter(&self) -> String {
        std::env::var(LOG_FILTER_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.log.filter.clone())
    }

    /// Writes the default config template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
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

fn resolve_base_url(env_value: Option<&str>, config_value: &str) -> Result<String> {
    let candidate = env_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| Some(config_value.trim()).filter(|value| !value.is_empty()))
        .unwrap_or(Config::DEFAULT_API_BASE_URL);

    url::Url::parse(candidate).with_context(|| format!("Invalid API base URL: {candidate}"))?;
    Ok(candidate.trim_end_matches('/').to_string())
}
