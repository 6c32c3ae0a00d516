//! Authentication handling for GitHub API.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};

/// Environment variable holding the personal access token used for commits.
pub const TOKEN_ENV_VAR: &str = "GIT_PAT";

/// Authentication method for GitHub API.
#[derive(Debug, Clone)]
pub enum Auth {
    /// Use token from environment variable.
    EnvVar(String),

    /// Use a specific token.
    Token(SecretString),
}

impl Auth {
    /// Auth backed by the `GIT_PAT` environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::EnvVar(TOKEN_ENV_VAR.into())
    }

    /// Resolve the authentication to a token.
    ///
    /// # Errors
    /// Returns [`Error::NoToken`] if the token is missing or blank.
    pub fn resolve(&self) -> Result<SecretString> {
        let token = match self {
            Self::EnvVar(var) => std::env::var(var)
                .map(SecretString::from)
                .map_err(|_| Error::NoToken)?,
            Self::Token(t) => t.clone(),
        };

        if token.expose_secret().trim().is_empty() {
            return Err(Error::NoToken);
        }

        Ok(token)
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::from_env()
    }
}
