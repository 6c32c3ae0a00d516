//! Git data types exchanged with the remote object-and-ref API.

use serde::{Deserialize, Serialize};

/// File mode for regular (non-executable) files.
pub const REGULAR_FILE_MODE: &str = "100644";

/// One file to publish: a repo-relative path and its full UTF-8 content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repo-relative path, e.g. `content/recipes/x/index.md`.
    pub path: String,

    /// Full file content.
    pub content: String,
}

impl FileChange {
    /// Create a file change.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Blob,
}

/// An entry layered onto a base tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root.
    pub path: String,

    /// Git file mode, always [`REGULAR_FILE_MODE`] for entries we create.
    pub mode: String,

    /// Object kind.
    #[serde(rename = "type")]
    pub kind: ObjectKind,

    /// Address of the blob holding the content.
    pub sha: String,
}

impl TreeEntry {
    /// A regular-file blob entry.
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: REGULAR_FILE_MODE.to_string(),
            kind: ObjectKind::Blob,
            sha: sha.into(),
        }
    }
}

/// Request to create a commit with a single parent.
#[derive(Debug, Clone, Serialize)]
pub struct NewCommit {
    /// Commit message.
    pub message: String,

    /// Root tree address.
    pub tree: String,

    /// Parent commit addresses. The workflow always sends exactly one.
    pub parents: Vec<String>,
}

/// A commit created on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitInfo {
    /// Commit address.
    pub sha: String,

    /// Browser URL for the commit.
    pub html_url: String,
}

/// Compare-and-swap request for a branch ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// Address the ref must still point at.
    pub expected: String,

    /// Address to move the ref to.
    pub new: String,
}

/// Result of a conditional ref update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefUpdateOutcome {
    /// The ref now points at the new address.
    Advanced,

    /// The ref had moved; nothing was changed.
    Conflict {
        /// Where the ref points now, when the remote told us.
        current: Option<String>,
    },
}
