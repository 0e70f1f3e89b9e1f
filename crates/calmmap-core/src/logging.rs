//! Tracing setup.
//!
//! Logs go to `${CALMMAP_HOME}/logs/calmmap.log` through a non-blocking writer,
//! so terminal output stays reserved for the front end.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

const LOG_FILE_NAME: &str = "calmmap.log";
const FALLBACK_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// The returned guard flushes buffered lines on drop; hold it for the process lifetime.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber is already set.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = paths::log_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(config.log_filter())
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install tracing subscriber: {err}"))?;

    Ok(guard)
}

/// Returns a masked version of a credential for logs (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(12).collect();
    format!("{prefix}...")
}
