//! Repository coordinates for publishing commits.

use crate::error::{Error, Result};

/// Environment variable naming the repository owner.
pub const OWNER_ENV_VAR: &str = "GIT_REPO_OWNER";

/// Environment variable naming the repository.
pub const REPO_ENV_VAR: &str = "GIT_REPO_NAME";

/// Environment variable overriding the target branch.
pub const BRANCH_ENV_VAR: &str = "GIT_DEFAULT_BRANCH";

/// Which repository and branch commits are published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Branch whose tip is advanced.
    pub branch: String,
}

impl RepoConfig {
    /// Branch used when none is configured.
    pub const DEFAULT_BRANCH: &'static str = "main";

    /// Create a config for an explicit repository and branch.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Read coordinates from `GIT_REPO_OWNER`, `GIT_REPO_NAME` and `GIT_DEFAULT_BRANCH`.
    ///
    /// # Errors
    /// Returns [`Error::MissingConfig`] naming every absent variable.
    pub fn from_env(default_branch: &str) -> Result<Self> {
        Self::from_lookup(default_branch, |key| std::env::var(key).ok())
    }

    /// Read coordinates through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`Error::MissingConfig`] naming every absent variable.
    pub fn from_lookup(
        default_branch: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let owner = get(OWNER_ENV_VAR);
        let repo = get(REPO_ENV_VAR);

        match (owner, repo) {
            (Some(owner), Some(repo)) => {
                let branch = get(BRANCH_ENV_VAR).unwrap_or_else(|| default_branch.to_string());
                Ok(Self::new(owner, repo, branch))
            }
            (owner, repo) => {
                let missing: Vec<&str> = [(OWNER_ENV_VAR, owner), (REPO_ENV_VAR, repo)]
                    .into_iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(k, _)| k)
                    .collect();
                Err(Error::MissingConfig(missing.join(", ")))
            }
        }
    }
}
