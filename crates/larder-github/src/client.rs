//! GitHub git-data API client.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::traits::GitDataApi;
use crate::types::{CommitInfo, NewCommit, RefUpdate, RefUpdateOutcome, TreeEntry};

// === Internal API response types ===

/// A ref as returned by `GET /git/ref/...`.
#[derive(serde::Deserialize)]
struct ApiRef {
    object: ApiObject,
}

/// Minimal object pointer (ref target, commit tree, created blob or tree).
#[derive(serde::Deserialize)]
struct ApiObject {
    sha: String,
}

/// A commit as returned by `GET /git/commits/{sha}`.
#[derive(serde::Deserialize)]
struct ApiCommit {
    tree: ApiObject,
}

#[derive(serde::Serialize)]
struct CreateBlob<'a> {
    content: &'a str,
    encoding: &'static str,
}

#[derive(serde::Serialize)]
struct CreateTree<'a> {
    base_tree: &'a str,
    tree: &'a [TreeEntry],
}

#[derive(serde::Serialize)]
struct PatchRef<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub API client.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    /// Token stored as `SecretString` for automatic zeroization on drop.
    token: SecretString,
}

impl GitHubClient {
    /// Default GitHub API URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new GitHub client.
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn new(auth: &Auth) -> Result<Self> {
        Self::with_base_url(auth, Self::DEFAULT_API_URL)
    }

    /// Create a new GitHub client with a custom API URL (for GitHub Enterprise).
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn with_base_url(auth: &Auth, base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(auth, base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom API URL and per-request timeout.
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn with_timeout(
        auth: &Auth,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let token = auth.resolve()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("larder"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            token,
        })
    }

    fn url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!("{}/repos/{owner}/{repo}/git{path}", self.base_url)
    }

    /// Attach auth and send, mapping client-side timeouts to [`Error::Timeout`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.timeout)
                } else {
                    Error::Network(e)
                }
            })
    }

    /// Make a POST request.
    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(self.client.post(url).json(body)).await?;
        self.handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.timeout)
                } else {
                    Error::Network(e)
                }
            })?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(error_from_response(response).await)
    }

    // === Ref Operations ===

    /// Get the commit SHA at the tip of a branch.
    ///
    /// # Errors
    /// Returns [`Error::RefNotFound`] if the branch does not exist.
    pub async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> Result<String> {
        let url = self.url(owner, repo, &format!("/ref/heads/{branch}"));
        let response = self.send(self.client.get(&url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::RefNotFound(branch.to_string()));
        }

        let api_ref: ApiRef = self.handle_response(response).await?;
        Ok(api_ref.object.sha)
    }

    /// Advance a branch to `update.new` if it still points at `update.expected`.
    ///
    /// The ref is re-read first; the update itself is never forced, so GitHub
    /// also rejects it (422) when the new commit is not a fast-forward of the
    /// current tip. Other 409/422 rejections are API errors.
    ///
    /// # Errors
    /// Returns error if the API call fails for reasons other than a lost race.
    pub async fn update_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: &RefUpdate,
    ) -> Result<RefUpdateOutcome> {
        let current = self.get_branch_sha(owner, repo, branch).await?;
        if current != update.expected {
            return Ok(RefUpdateOutcome::Conflict {
                current: Some(current),
            });
        }

        let url = self.url(owner, repo, &format!("/refs/heads/{branch}"));
        let body = PatchRef {
            sha: &update.new,
            force: false,
        };
        let response = self.send(self.client.patch(&url).json(&body)).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(RefUpdateOutcome::Advanced);
        }
        if !matches!(
            status,
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            return Err(error_from_response(response).await);
        }

        // Only a rejected fast-forward means the branch moved underneath us.
        let message = response.text().await.unwrap_or_default();
        if message.to_ascii_lowercase().contains("fast forward") {
            Ok(RefUpdateOutcome::Conflict { current: None })
        } else {
            Err(Error::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }

    // === Object Operations ===

    /// Get the root tree SHA of a commit.
    ///
    /// # Errors
    /// Returns [`Error::ObjectNotFound`] if the commit does not exist.
    pub async fn get_commit_tree(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> Result<String> {
        let url = self.url(owner, repo, &format!("/commits/{commit_sha}"));
        let response = self.send(self.client.get(&url)).await?;

        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            return Err(Error::ObjectNotFound(commit_sha.to_string()));
        }

        let commit: ApiCommit = self.handle_response(response).await?;
        Ok(commit.tree.sha)
    }

    /// Create a UTF-8 blob.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_blob(&self, owner: &str, repo: &str, content: &str) -> Result<String> {
        let body = CreateBlob {
            content,
            encoding: "utf-8",
        };
        let blob: ApiObject = self.post(&self.url(owner, repo, "/blobs"), &body).await?;
        Ok(blob.sha)
    }

    /// Create a tree layered onto `base_tree`.
    ///
    /// # Errors
    /// Returns error if the base tree is invalid or the API call fails.
    pub async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        let body = CreateTree {
            base_tree,
            tree: entries,
        };
        let tree: ApiObject = self.post(&self.url(owner, repo, "/trees"), &body).await?;
        Ok(tree.sha)
    }

    /// Create a commit.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: &NewCommit,
    ) -> Result<CommitInfo> {
        self.post(&self.url(owner, repo, "/commits"), commit).await
    }
}

/// Map a non-success response to an [`Error`].
async fn error_from_response(response: Response) -> Error {
    let status_code = response.status().as_u16();

    match status_code {
        401 => Error::AuthenticationFailed,
        403 if response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|v| v == "0") =>
        {
            Error::RateLimited
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Error::ApiError {
                status: status_code,
                message: text,
            }
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

// === Trait Implementation ===

impl GitDataApi for GitHubClient {
    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> Result<String> {
        self.get_branch_sha(owner, repo, branch).await
    }

    async fn update_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: &RefUpdate,
    ) -> Result<RefUpdateOutcome> {
        self.update_branch(owner, repo, branch, update).await
    }

    async fn get_commit_tree(&self, owner: &str, repo: &str, commit_sha: &str) -> Result<String> {
        self.get_commit_tree(owner, repo, commit_sha).await
    }

    async fn create_blob(&self, owner: &str, repo: &str, content: &str) -> Result<String> {
        self.create_blob(owner, repo, content).await
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        self.create_tree(owner, repo, base_tree, entries).await
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: &NewCommit,
    ) -> Result<CommitInfo> {
        self.create_commit(owner, repo, commit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Create a test client pointing to the mock server.
    fn test_client(base_url: &str) -> GitHubClient {
        let auth = Auth::Token(SecretString::from("test-token"));
        GitHubClient::with_base_url(&auth, base_url).unwrap()
    }

    /// Ref response JSON for testing.
    fn ref_json(branch: &str, sha: &str) -> serde_json::Value {
        serde_json::json!({
            "ref": format!("refs/heads/{branch}"),
            "node_id": "REF_node",
            "url": format!("https://api.github.com/repos/owner/repo/git/refs/heads/{branch}"),
            "object": {
                "sha": sha,
                "type": "commit",
                "url": format!("https://api.github.com/repos/owner/repo/git/commits/{sha}")
            }
        })
    }

    // === Ref Tests ===

    #[tokio::test]
    async fn test_get_branch_sha_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/main"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json("main", "abc123")))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let sha = client.get_branch_sha("owner", "repo", "main").await.unwrap();

        assert_eq!(sha, "abc123");
    }

    #[tokio::test]
    async fn test_get_branch_sha_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Not Found"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client.get_branch_sha("owner", "repo", "missing").await;

        assert!(matches!(result, Err(Error::RefNotFound(b)) if b == "missing"));
    }

    #[tokio::test]
    async fn test_update_branch_advances_when_tip_matches() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json("main", "old")))
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/repos/owner/repo/git/refs/heads/main"))
            .and(body_json(serde_json::json!({ "sha": "new", "force": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json("main", "new")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let update = RefUpdate {
            expected: "old".into(),
            new: "new".into(),
        };
        let outcome = client
            .update_branch("owner", "repo", "main", &update)
            .await
            .unwrap();

        assert_eq!(outcome, RefUpdateOutcome::Advanced);
    }

    #[tokio::test]
    async fn test_update_branch_conflict_when_tip_moved() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json("main", "other")))
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/repos/owner/repo/git/refs/heads/main"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let update = RefUpdate {
            expected: "old".into(),
            new: "new".into(),
        };
        let outcome = client
            .update_branch("owner", "repo", "main", &update)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RefUpdateOutcome::Conflict {
                current: Some("other".into())
            }
        );
    }

    #[tokio::test]
    async fn test_update_branch_not_fast_forward() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json("main", "old")))
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/repos/owner/repo/git/refs/heads/main"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Update is not a fast forward"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let update = RefUpdate {
            expected: "old".into(),
            new: "new".into(),
        };
        let outcome = client
            .update_branch("owner", "repo", "main", &update)
            .await
            .unwrap();

        assert_eq!(outcome, RefUpdateOutcome::Conflict { current: None });
    }

    #[tokio::test]
    async fn test_update_branch_rejection_other_than_race_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json("main", "old")))
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/repos/owner/repo/git/refs/heads/main"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Object does not exist"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let update = RefUpdate {
            expected: "old".into(),
            new: "bogus".into(),
        };
        let result = client.update_branch("owner", "repo", "main", &update).await;

        assert!(matches!(
            result,
            Err(Error::ApiError { status: 422, ref message }) if message.contains("Object does not exist")
        ));
    }

    // === Object Tests ===

    #[tokio::test]
    async fn test_get_commit_tree() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/commits/c0ffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "c0ffee",
                "message": "Initial",
                "tree": { "sha": "tree1", "url": "https://api.github.com/x" },
                "parents": []
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let tree = client
            .get_commit_tree("owner", "repo", "c0ffee")
            .await
            .unwrap();

        assert_eq!(tree, "tree1");
    }

    #[tokio::test]
    async fn test_get_commit_tree_missing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/commits/deadbeef"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client.get_commit_tree("owner", "repo", "deadbeef").await;

        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_commit_tree_malformed_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/commits/c0ffee"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sha": "c0ffee" })),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client.get_commit_tree("owner", "repo", "c0ffee").await;

        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_create_blob_sends_utf8_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/git/blobs"))
            .and(body_json(serde_json::json!({
                "content": "# Soup\n",
                "encoding": "utf-8"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sha": "blob1",
                "url": "https://api.github.com/repos/owner/repo/git/blobs/blob1"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let sha = client
            .create_blob("owner", "repo", "# Soup\n")
            .await
            .unwrap();

        assert_eq!(sha, "blob1");
    }

    #[tokio::test]
    async fn test_create_tree_with_base() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/git/trees"))
            .and(body_json(serde_json::json!({
                "base_tree": "base",
                "tree": [{
                    "path": "content/recipes/soup/index.md",
                    "mode": "100644",
                    "type": "blob",
                    "sha": "blob1"
                }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sha": "tree2",
                "url": "https://api.github.com/x",
                "tree": [],
                "truncated": false
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let entries = [TreeEntry::blob("content/recipes/soup/index.md", "blob1")];
        let sha = client
            .create_tree("owner", "repo", "base", &entries)
            .await
            .unwrap();

        assert_eq!(sha, "tree2");
    }

    #[tokio::test]
    async fn test_create_commit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/git/commits"))
            .and(body_json(serde_json::json!({
                "message": "Add recipe: Soup",
                "tree": "tree2",
                "parents": ["old"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sha": "new",
                "html_url": "https://github.com/owner/repo/commit/new",
                "message": "Add recipe: Soup"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let commit = NewCommit {
            message: "Add recipe: Soup".into(),
            tree: "tree2".into(),
            parents: vec!["old".into()],
        };
        let info = client.create_commit("owner", "repo", &commit).await.unwrap();

        assert_eq!(info.sha, "new");
        assert_eq!(info.html_url, "https://github.com/owner/repo/commit/new");
    }

    // === Error Tests ===

    #[tokio::test]
    async fn test_unauthorized_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/git/blobs"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client.create_blob("owner", "repo", "x").await;

        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_rate_limited_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/git/ref/heads/main"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(serde_json::json!({
                        "message": "API rate limit exceeded"
                    })),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client.get_branch_sha("owner", "repo", "main").await;

        assert!(matches!(result, Err(Error::RateLimited)));
    }

    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/git/trees"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let result = client.create_tree("owner", "repo", "base", &[]).await;

        assert!(
            matches!(result, Err(Error::ApiError { status: 500, ref message }) if message == "boom")
        );
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/git/blobs"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({ "sha": "late" })),
            )
            .mount(&mock_server)
            .await;

        let auth = Auth::Token(SecretString::from("test-token"));
        let client =
            GitHubClient::with_timeout(&auth, mock_server.uri(), Duration::from_millis(50))
                .unwrap();
        let result = client.create_blob("owner", "repo", "x").await;

        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let auth = Auth::Token(SecretString::from("super-secret"));
        let client = GitHubClient::with_base_url(&auth, "http://localhost").unwrap();
        let debug = format!("{client:?}");

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
