//! Error types for larder-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in larder-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request is malformed (missing title, bad slug, ...).
    #[error("{0}")]
    Validation(String),

    /// Recipe does not exist.
    #[error("recipe not found: {0}")]
    NotFound(String),

    /// A recipe with this slug already exists.
    #[error("recipe with slug \"{0}\" already exists")]
    AlreadyExists(String),

    /// Recipe file could not be parsed.
    #[error("failed to parse {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
