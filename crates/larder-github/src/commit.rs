//! Atomic multi-file commits through the git-data API.
//!
//! Publishing a batch of files is a fixed sequence against the remote:
//!
//! 1. read the branch tip
//! 2. resolve the tip commit to its root tree
//! 3. upload every file as a blob (bounded fan-out, fail-fast)
//! 4. create a tree layering the new blobs onto the base tree
//! 5. create a commit whose single parent is the tip, then advance the
//!    branch only if it still points at that tip
//!
//! Nothing observable changes until step 5 succeeds. Objects created before a
//! failure are unreferenced and harmless. A lost race at step 5 surfaces as
//! [`CommitError::Conflict`]; callers re-run the whole sequence to retry.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RepoConfig;
use crate::error::Error;
use crate::traits::GitDataApi;
use crate::types::{FileChange, NewCommit, RefUpdate, RefUpdateOutcome, TreeEntry};

/// Workflow stage, reported with remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the branch tip.
    ReadRef,
    /// Resolving the tip commit to its root tree.
    ResolveTree,
    /// Uploading file contents as blobs.
    UploadBlobs,
    /// Creating the overlay tree.
    BuildTree,
    /// Creating the commit object.
    CreateCommit,
    /// Moving the branch to the new commit.
    AdvanceRef,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadRef => "reading branch ref",
            Self::ResolveTree => "resolving base tree",
            Self::UploadBlobs => "uploading blobs",
            Self::BuildTree => "building tree",
            Self::CreateCommit => "creating commit",
            Self::AdvanceRef => "advancing branch ref",
        };
        f.write_str(name)
    }
}

/// Why a commit was not applied.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Repository coordinates or credential missing.
    #[error("GitHub not configured: {0}")]
    Configuration(String),

    /// Malformed request; nothing was sent.
    #[error("invalid commit request: {0}")]
    Validation(String),

    /// A remote call failed or timed out.
    #[error("{stage} failed: {source}")]
    Remote {
        stage: Stage,
        #[source]
        source: Error,
    },

    /// The branch moved after its tip was read.
    #[error("branch '{branch}' moved away from {expected}; commit {commit} was not applied")]
    Conflict {
        branch: String,
        expected: String,
        commit: String,
        current: Option<String>,
    },
}

/// A commit that was published and is now the branch tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// New commit address.
    pub sha: String,

    /// Browser URL for the commit.
    pub url: String,

    /// Paths written, in request order.
    pub files: Vec<String>,
}

/// Check a request before anything is sent.
///
/// # Errors
/// Returns [`CommitError::Validation`] describing the first problem found.
pub fn validate(files: &[FileChange], message: &str) -> Result<(), CommitError> {
    if files.is_empty() {
        return Err(CommitError::Validation(
            "files must not be empty".to_string(),
        ));
    }

    if message.trim().is_empty() {
        return Err(CommitError::Validation("message is required".to_string()));
    }

    for file in files {
        if file.path.trim().is_empty() {
            return Err(CommitError::Validation(
                "each file must have a path".to_string(),
            ));
        }
        if file.path.starts_with('/') {
            return Err(CommitError::Validation(format!(
                "path must be repo-relative: {}",
                file.path
            )));
        }
        if file.content.is_empty() {
            return Err(CommitError::Validation(format!(
                "file has no content: {}",
                file.path
            )));
        }
    }

    Ok(())
}

/// Publishes file batches to one branch of one repository.
#[derive(Debug)]
pub struct Committer<A> {
    api: A,
    repo: RepoConfig,
    blob_concurrency: usize,
    call_timeout: Duration,
}

impl<A: GitDataApi> Committer<A> {
    /// Uploads in flight at once during the blob stage.
    pub const DEFAULT_BLOB_CONCURRENCY: usize = 8;

    /// Upper bound on any single remote call.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a committer for `repo` using `api`.
    pub const fn new(api: A, repo: RepoConfig) -> Self {
        Self {
            api,
            repo,
            blob_concurrency: Self::DEFAULT_BLOB_CONCURRENCY,
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Set the blob upload parallelism (at least one).
    #[must_use]
    pub fn with_blob_concurrency(mut self, limit: usize) -> Self {
        self.blob_concurrency = limit.max(1);
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Target repository and branch.
    pub const fn repo(&self) -> &RepoConfig {
        &self.repo
    }

    /// The underlying API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Publish `files` as one commit on the configured branch.
    ///
    /// # Errors
    /// - [`CommitError::Validation`] before any remote call for bad input
    /// - [`CommitError::Remote`] if any stage fails or times out
    /// - [`CommitError::Conflict`] if the branch moved concurrently
    pub async fn commit(
        &self,
        files: &[FileChange],
        message: &str,
    ) -> Result<CommitOutcome, CommitError> {
        validate(files, message)?;

        let RepoConfig {
            owner,
            repo,
            branch,
        } = &self.repo;

        let tip = self
            .remote(Stage::ReadRef, self.api.get_branch_sha(owner, repo, branch))
            .await?;
        debug!(%branch, %tip, "read branch tip");

        let base_tree = self
            .remote(
                Stage::ResolveTree,
                self.api.get_commit_tree(owner, repo, &tip),
            )
            .await?;
        debug!(%base_tree, "resolved base tree");

        let blobs = self.upload_blobs(files).await?;
        debug!(count = blobs.len(), "uploaded blobs");

        let entries: Vec<TreeEntry> = files
            .iter()
            .zip(blobs)
            .map(|(file, sha)| TreeEntry::blob(&file.path, sha))
            .collect();

        let tree = self
            .remote(
                Stage::BuildTree,
                self.api.create_tree(owner, repo, &base_tree, &entries),
            )
            .await?;
        debug!(%tree, "built tree");

        let new_commit = NewCommit {
            message: message.to_string(),
            tree,
            parents: vec![tip.clone()],
        };
        let commit = self
            .remote(
                Stage::CreateCommit,
                self.api.create_commit(owner, repo, &new_commit),
            )
            .await?;
        debug!(commit = %commit.sha, "created commit");

        let update = RefUpdate {
            expected: tip,
            new: commit.sha.clone(),
        };
        let outcome = self
            .remote(
                Stage::AdvanceRef,
                self.api.update_branch(owner, repo, branch, &update),
            )
            .await?;

        match outcome {
            RefUpdateOutcome::Advanced => {
                info!(%branch, commit = %commit.sha, files = files.len(), "published commit");
                Ok(CommitOutcome {
                    sha: commit.sha,
                    url: commit.html_url,
                    files: files.iter().map(|f| f.path.clone()).collect(),
                })
            }
            RefUpdateOutcome::Conflict { current } => {
                warn!(%branch, expected = %update.expected, ?current, "branch moved, commit not applied");
                Err(CommitError::Conflict {
                    branch: branch.clone(),
                    expected: update.expected,
                    commit: commit.sha,
                    current,
                })
            }
        }
    }

    /// Upload every file's content, returning addresses in input order.
    ///
    /// At most `blob_concurrency` uploads are in flight. Uploads complete in
    /// any order; the first failure is returned as soon as it happens and
    /// drops the rest.
    async fn upload_blobs(&self, files: &[FileChange]) -> Result<Vec<String>, CommitError> {
        let RepoConfig { owner, repo, .. } = &self.repo;

        let mut uploads = stream::iter(0..files.len())
            .map(|index| async move {
                let file = &files[index];
                let sha = self
                    .remote(
                        Stage::UploadBlobs,
                        self.api.create_blob(owner, repo, &file.content),
                    )
                    .await?;
                Ok::<_, CommitError>((index, sha))
            })
            .buffer_unordered(self.blob_concurrency);

        let mut shas = vec![String::new(); files.len()];
        while let Some((index, sha)) = uploads.try_next().await? {
            shas[index] = sha;
        }

        Ok(shas)
    }

    /// Run one remote call under the per-call timeout.
    async fn remote<T>(
        &self,
        stage: Stage,
        call: impl Future<Output = crate::Result<T>>,
    ) -> Result<T, CommitError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(|source| CommitError::Remote { stage, source }),
            Err(_) => Err(CommitError::Remote {
                stage,
                source: Error::Timeout(self.call_timeout),
            }),
        }
    }
}
