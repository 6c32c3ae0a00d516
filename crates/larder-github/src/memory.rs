//! In-memory git object store implementing [`GitDataApi`].
//!
//! Objects are content-addressed with SHA-1 like git: blobs hash exactly as
//! `git hash-object` would, trees and commits hash a canonical rendering of
//! their fields. Owner and repo arguments are ignored. Every API call is
//! recorded so tests can assert which stages ran.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};
use crate::overlay::{TreeMap, overlay};
use crate::traits::GitDataApi;
use crate::types::{CommitInfo, FileChange, NewCommit, RefUpdate, RefUpdateOutcome, TreeEntry};

/// One recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    GetBranch(String),
    UpdateBranch(String),
    GetCommit,
    CreateBlob,
    CreateTree,
    CreateCommit,
}

/// A stored commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

#[derive(Default)]
struct Objects {
    blobs: HashMap<String, String>,
    trees: HashMap<String, TreeMap>,
    commits: HashMap<String, StoredCommit>,
    refs: HashMap<String, String>,
    calls: Vec<RemoteCall>,
    /// Commit another writer lands right before our next ref update.
    pending_race: Option<(String, String)>,
}

impl Objects {
    fn write_blob(&mut self, content: &str) -> String {
        let sha = hash(&[
            format!("blob {}\0", content.len()).as_bytes(),
            content.as_bytes(),
        ]);
        self.blobs
            .entry(sha.clone())
            .or_insert_with(|| content.to_string());
        sha
    }

    fn write_tree(&mut self, base_sha: &str, entries: &[TreeEntry]) -> Result<String> {
        let base = self.trees.get(base_sha).ok_or_else(|| Error::ApiError {
            status: 422,
            message: format!("base_tree is not a valid tree: {base_sha}"),
        })?;

        if let Some(missing) = entries.iter().find(|e| !self.blobs.contains_key(&e.sha)) {
            return Err(Error::ApiError {
                status: 422,
                message: format!("tree.sha {} is not a valid blob", missing.sha),
            });
        }

        let tree = overlay(base, entries);
        Ok(self.store_tree(tree))
    }

    fn store_tree(&mut self, tree: TreeMap) -> String {
        let mut rendered = String::from("tree\n");
        for (path, sha) in &tree {
            rendered.push_str(&format!("{path}\0{sha}\n"));
        }
        let sha = hash(&[rendered.as_bytes()]);
        self.trees.insert(sha.clone(), tree);
        sha
    }

    fn write_commit(&mut self, commit: &NewCommit) -> Result<String> {
        if !self.trees.contains_key(&commit.tree) {
            return Err(Error::ApiError {
                status: 422,
                message: format!("tree {} does not exist", commit.tree),
            });
        }
        if let Some(parent) = commit.parents.iter().find(|p| !self.commits.contains_key(*p)) {
            return Err(Error::ApiError {
                status: 422,
                message: format!("parent {parent} does not exist"),
            });
        }

        Ok(self.store_commit(commit))
    }

    fn store_commit(&mut self, commit: &NewCommit) -> String {
        let mut rendered = format!("commit\ntree {}\n", commit.tree);
        for parent in &commit.parents {
            rendered.push_str(&format!("parent {parent}\n"));
        }
        rendered.push('\n');
        rendered.push_str(&commit.message);

        let sha = hash(&[rendered.as_bytes()]);
        self.commits.insert(
            sha.clone(),
            StoredCommit {
                message: commit.message.clone(),
                tree: commit.tree.clone(),
                parents: commit.parents.clone(),
            },
        );
        sha
    }

    /// Build a commit of `files` on top of `parent` without touching refs.
    fn commit_files(&mut self, parent: Option<&str>, files: &[FileChange], message: &str) -> String {
        let base = parent
            .and_then(|p| self.commits.get(p))
            .and_then(|c| self.trees.get(&c.tree))
            .cloned()
            .unwrap_or_default();

        let entries: Vec<TreeEntry> = files
            .iter()
            .map(|f| TreeEntry::blob(&f.path, self.write_blob(&f.content)))
            .collect();
        let tree = self.store_tree(overlay(&base, &entries));

        let commit = NewCommit {
            message: message.to_string(),
            tree,
            parents: parent.map(str::to_string).into_iter().collect(),
        };
        self.store_commit(&commit)
    }
}

fn hash(parts: &[&[u8]]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// In-memory stand-in for the GitHub git-data API.
#[derive(Default)]
pub struct MemoryRemote {
    objects: Mutex<Objects>,
    fail_blob: Option<String>,
    blobs_in_flight: AtomicUsize,
    max_blobs_in_flight: AtomicUsize,
}

impl MemoryRemote {
    /// Create an empty store with no branches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every blob upload of exactly `content` fail with a 500.
    #[must_use]
    pub fn fail_blob_with_content(mut self, content: impl Into<String>) -> Self {
        self.fail_blob = Some(content.into());
        self
    }

    /// Create a root commit holding `files` and point `branch` at it.
    ///
    /// Returns the commit address. Seeding is not recorded as API calls.
    pub fn seed(&self, branch: &str, files: &[(&str, &str)]) -> String {
        let files: Vec<FileChange> = files
            .iter()
            .map(|(path, content)| FileChange::new(*path, *content))
            .collect();

        let mut objects = self.objects.lock();
        let sha = objects.commit_files(None, &files, "Initial commit");
        objects.refs.insert(branch.to_string(), sha.clone());
        sha
    }

    /// Simulate another writer: build a commit of `files` on the current tip
    /// of `branch` and land it just before the next ref update.
    ///
    /// Returns the other writer's commit address.
    pub fn race_before_update(&self, branch: &str, files: &[FileChange], message: &str) -> String {
        let mut objects = self.objects.lock();
        let tip = objects.refs.get(branch).cloned();
        let sha = objects.commit_files(tip.as_deref(), files, message);
        objects.pending_race = Some((branch.to_string(), sha.clone()));
        sha
    }

    /// Recorded API calls, oldest first.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.objects.lock().calls.clone()
    }

    /// Current tip of a branch.
    pub fn branch_tip(&self, branch: &str) -> Option<String> {
        self.objects.lock().refs.get(branch).cloned()
    }

    /// A stored commit.
    pub fn commit(&self, sha: &str) -> Option<StoredCommit> {
        self.objects.lock().commits.get(sha).cloned()
    }

    /// Path-to-content snapshot of a commit's tree.
    pub fn files_at(&self, commit_sha: &str) -> Option<BTreeMap<String, String>> {
        let objects = self.objects.lock();
        let commit = objects.commits.get(commit_sha)?;
        let tree = objects.trees.get(&commit.tree)?;
        tree.iter()
            .map(|(path, sha)| Some((path.clone(), objects.blobs.get(sha)?.clone())))
            .collect()
    }

    /// Highest number of blob uploads observed running at once.
    pub fn max_blobs_in_flight(&self) -> usize {
        self.max_blobs_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: RemoteCall) {
        self.objects.lock().calls.push(call);
    }
}

impl GitDataApi for MemoryRemote {
    async fn get_branch_sha(&self, _owner: &str, _repo: &str, branch: &str) -> Result<String> {
        self.record(RemoteCall::GetBranch(branch.to_string()));
        self.branch_tip(branch)
            .ok_or_else(|| Error::RefNotFound(branch.to_string()))
    }

    async fn update_branch(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        update: &RefUpdate,
    ) -> Result<RefUpdateOutcome> {
        let mut objects = self.objects.lock();
        objects.calls.push(RemoteCall::UpdateBranch(branch.to_string()));

        if let Some((raced, sha)) = objects.pending_race.take() {
            objects.refs.insert(raced, sha);
        }

        let current = objects
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::RefNotFound(branch.to_string()))?;

        if current != update.expected {
            return Ok(RefUpdateOutcome::Conflict {
                current: Some(current),
            });
        }

        objects.refs.insert(branch.to_string(), update.new.clone());
        Ok(RefUpdateOutcome::Advanced)
    }

    async fn get_commit_tree(&self, _owner: &str, _repo: &str, commit_sha: &str) -> Result<String> {
        let mut objects = self.objects.lock();
        objects.calls.push(RemoteCall::GetCommit);
        objects
            .commits
            .get(commit_sha)
            .map(|c| c.tree.clone())
            .ok_or_else(|| Error::ObjectNotFound(commit_sha.to_string()))
    }

    async fn create_blob(&self, _owner: &str, _repo: &str, content: &str) -> Result<String> {
        self.record(RemoteCall::CreateBlob);

        let running = self.blobs_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_blobs_in_flight.fetch_max(running, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.blobs_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_blob.as_deref() == Some(content) {
            return Err(Error::ApiError {
                status: 500,
                message: "simulated blob failure".to_string(),
            });
        }

        Ok(self.objects.lock().write_blob(content))
    }

    async fn create_tree(
        &self,
        _owner: &str,
        _repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        let mut objects = self.objects.lock();
        objects.calls.push(RemoteCall::CreateTree);
        objects.write_tree(base_tree, entries)
    }

    async fn create_commit(
        &self,
        _owner: &str,
        _repo: &str,
        commit: &NewCommit,
    ) -> Result<CommitInfo> {
        let mut objects = self.objects.lock();
        objects.calls.push(RemoteCall::CreateCommit);
        let sha = objects.write_commit(commit)?;
        Ok(CommitInfo {
            html_url: format!("memory://commit/{sha}"),
            sha,
        })
    }
}
