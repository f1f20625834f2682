//! Common paths for perchfeed data
//!
//! Everything lives under ~/.config/perchfeed/ on all platforms:
//! - config.toml - User configuration

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the perchfeed directory (~/.config/perchfeed/), creating it if needed
pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("perchfeed");
    fs::create_dir_all(&dir).context("Failed to create perchfeed directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/perchfeed/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("config.toml"))
}
