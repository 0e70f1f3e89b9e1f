//! `calmmap config` subcommands.

use anyhow::{Context, Result};
use calmmap_core::config::{Config, paths};

/// Prints where calmmap keeps its files. The config path comes first.
pub fn path() {
    println!("{}", paths::config_path().display());
    println!("credentials: {}", paths::credentials_path().display());
    println!("logs: {}", paths::log_dir().display());
}

pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    Config::init(&config_path)
        .with_context(|| format!("write default config to {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}
