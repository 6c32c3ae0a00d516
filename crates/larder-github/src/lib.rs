//! # larder-github
//!
//! GitHub git-data API integration for Larder: publishes a batch of file
//! changes to one branch as a single atomic commit.
//!
//! # Security
//!
//! Authentication tokens are stored using `SecretString` which automatically
//! zeroizes memory when dropped, reducing credential exposure in memory dumps.

mod auth;
mod client;
mod commit;
mod config;
mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod overlay;
mod traits;
mod types;

pub use auth::{Auth, TOKEN_ENV_VAR};
pub use client::GitHubClient;
pub use commit::{CommitError, CommitOutcome, Committer, Stage, validate};
pub use config::{BRANCH_ENV_VAR, OWNER_ENV_VAR, REPO_ENV_VAR, RepoConfig};
pub use error::{Error, Result};
// Re-export SecretString for constructing Auth::Token
pub use secrecy::SecretString;
pub use traits::GitDataApi;
pub use types::{
    CommitInfo, FileChange, NewCommit, ObjectKind, REGULAR_FILE_MODE, RefUpdate, RefUpdateOutcome,
    TreeEntry,
};
