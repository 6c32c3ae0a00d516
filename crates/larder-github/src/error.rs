//! Error types for larder-github.

use std::time::Duration;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication failed or token rejected.
    #[error("GitHub authentication failed - check GIT_PAT")]
    AuthenticationFailed,

    /// Token not found.
    #[error("no GitHub token found - set GIT_PAT")]
    NoToken,

    /// Required repository coordinates are missing.
    #[error("missing GitHub configuration: {0}")]
    MissingConfig(String),

    /// API rate limit exceeded.
    #[error("GitHub API rate limit exceeded - wait and try again")]
    RateLimited,

    /// Branch ref does not exist.
    #[error("branch not found: {0}")]
    RefNotFound(String),

    /// Git object (commit, tree) does not exist.
    #[error("git object not found: {0}")]
    ObjectNotFound(String),

    /// API error with status code.
    #[error("GitHub API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// A remote call did not complete in time.
    #[error("GitHub API call timed out after {0:?}")]
    Timeout(Duration),

    /// Network error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse GitHub response: {0}")]
    Parse(#[from] serde_json::Error),
}
