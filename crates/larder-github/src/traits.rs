//! Trait abstractions for the remote git object-and-ref API.
//!
//! This module defines the `GitDataApi` trait which abstracts the handful of
//! git-data operations the commit workflow needs, enabling dependency
//! injection and testability.

use crate::Result;
use crate::types::{CommitInfo, NewCommit, RefUpdate, RefUpdateOutcome, TreeEntry};

/// Trait for git object and ref operations.
///
/// This trait abstracts GitHub git-data API calls, allowing for:
/// - Dependency injection in the commit workflow and services
/// - The in-memory object store used in tests
///
/// All methods take `owner` and `repo` as parameters to support
/// operations across different repositories.
pub trait GitDataApi: Send + Sync {
    // === Refs ===

    /// Get the commit address at the tip of a branch.
    fn get_branch_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Move a branch to a new commit if it still points at the expected one.
    ///
    /// A lost race is reported as [`RefUpdateOutcome::Conflict`], not as an error.
    fn update_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: &RefUpdate,
    ) -> impl std::future::Future<Output = Result<RefUpdateOutcome>> + Send;

    // === Objects ===

    /// Get the root tree address of a commit.
    fn get_commit_tree(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Store content as a blob and return its address.
    fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Create a tree by layering `entries` onto `base_tree`.
    fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Create a commit object.
    fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: &NewCommit,
    ) -> impl std::future::Future<Output = Result<CommitInfo>> + Send;
}
