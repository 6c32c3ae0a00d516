//! Configuration management for Larder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "larder.toml";

/// Larder configuration loaded from `larder.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where recipe content is read from.
    #[serde(default)]
    pub content: ContentConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// GitHub publishing settings.
    #[serde(default)]
    pub github: GitHubConfig,
}

impl Config {
    /// Load config from a TOML file. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Content location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Repository root holding `content/recipes`.
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from(".")
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8888".into()
}

/// GitHub-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Custom API URL for GitHub Enterprise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Branch commits are published to, unless `GIT_DEFAULT_BRANCH` is set.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Blob uploads in flight at once.
    #[serde(default = "default_blob_concurrency")]
    pub blob_concurrency: usize,

    /// Upper bound on each API call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GitHubConfig {
    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            branch: default_branch(),
            blob_concurrency: default_blob_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_branch() -> String {
    "main".into()
}

const fn default_blob_concurrency() -> usize {
    8
}

const fn default_timeout_secs() -> u64 {
    30
}
