//! Configuration module for perchfeed

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::DEFAULT_PLACEHOLDER_IMAGE;

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Id of the signed-in user, used to resolve "liked by me"
    #[serde(default)]
    pub current_user_id: Option<String>,

    /// Thumbnail shown for posts without images
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// Comment levels rendered (roots count as one)
    #[serde(default = "default_reply_depth")]
    pub reply_depth: usize,

    /// Posts whose comment trees are kept in memory (0 = unbounded)
    #[serde(default = "default_comment_cache_capacity")]
    pub comment_cache_capacity: usize,

    /// Username → user id entries kept in memory (0 = unbounded)
    #[serde(default = "default_user_cache_capacity")]
    pub user_cache_capacity: usize,
}

fn default_placeholder_image() -> String {
    DEFAULT_PLACEHOLDER_IMAGE.to_string()
}

fn default_reply_depth() -> usize {
    2
}

fn default_comment_cache_capacity() -> usize {
    100
}

fn default_user_cache_capacity() -> usize {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_user_id: None,
            placeholder_image: default_placeholder_image(),
            reply_depth: default_reply_depth(),
            comment_cache_capacity: default_comment_cache_capacity(),
            user_cache_capacity: default_user_cache_capacity(),
        }
    }
}

impl Config {
    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = crate::paths::config_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            if config.reply_depth < 2 {
                tracing::warn!(
                    "reply_depth = {} is treated as 2: roots with a flattened reply list",
                    config.reply_depth
                );
            }
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = crate::paths::config_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// The configured user id, if set and not blank
    pub fn current_user(&self) -> Option<&str> {
        self.current_user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
