use std::path::Path;

use anyhow::{Context, Result};
use larder_core::{Config, RecipeStore};
use larder_github::GitHubClient;
use tracing::debug;

use crate::services::{RecipeService, github_committer};

/// Load `larder.toml` (or the `--config` override).
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    debug!(path = %path.display(), content = %config.content.dir.display(), "config loaded");
    Ok(config)
}

/// Build the recipe service over the configured content directory.
///
/// A missing GitHub configuration doesn't fail here; commits report it.
pub fn open_service(config: &Config) -> RecipeService<GitHubClient> {
    let store = RecipeStore::new(&config.content.dir);
    let publisher = github_committer(config);
    if let Err(e) = &publisher {
        debug!(error = %e, "publishing disabled");
    }
    RecipeService::new(store, publisher)
}

/// Runtime for commands that talk to the network.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}
