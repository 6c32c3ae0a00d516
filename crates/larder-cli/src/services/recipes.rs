//! Recipe service shared by the HTTP API, the tool server and the CLI.
//!
//! Reads come straight from the content store. Writes are drafted locally
//! and only reach the repository through [`RecipeService::commit`].

use larder_core::{
    Config, RecipeDraft, RecipeInput, RecipeResponse, RecipeStore, RecipeUpdate, SearchParams,
    TagsIndex, VariationRequest, draft, tags_index, today,
};
use larder_github::{
    Auth, CommitError, Committer, Error as GitHubError, FileChange, GitDataApi, GitHubClient,
    RepoConfig, SecretString, TOKEN_ENV_VAR,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Why a service operation failed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Recipe(#[from] larder_core::Error),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Result type alias using [`ServiceError`].
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Search output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub recipes: Vec<RecipeResponse>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Files to publish as one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRequest {
    pub files: Vec<FileChange>,
    pub message: String,
}

/// Address and link of a published commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub url: String,
}

/// Output of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    pub success: bool,
    pub commit: CommitRef,
    pub files: Vec<String>,
    pub message: String,
}

/// Build the GitHub publisher from config and environment.
///
/// # Errors
/// Returns [`CommitError::Configuration`] naming every missing variable.
pub fn github_committer(config: &Config) -> Result<Committer<GitHubClient>, CommitError> {
    github_committer_with(config, |key| std::env::var(key).ok())
}

fn github_committer_with(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Committer<GitHubClient>, CommitError> {
    let github = &config.github;
    let api_url = github
        .api_url
        .as_deref()
        .unwrap_or(GitHubClient::DEFAULT_API_URL);

    let repo = RepoConfig::from_lookup(&github.branch, &lookup);
    let auth = Auth::Token(SecretString::from(
        lookup(TOKEN_ENV_VAR).unwrap_or_default(),
    ));
    let client = GitHubClient::with_timeout(&auth, api_url, github.timeout());

    match (repo, client) {
        (Ok(repo), Ok(client)) => Ok(Committer::new(client, repo)
            .with_blob_concurrency(github.blob_concurrency)
            .with_call_timeout(github.timeout())),
        (repo, client) => {
            let mut missing = Vec::new();
            if let Err(GitHubError::MissingConfig(vars)) = &repo {
                missing.push(vars.clone());
            }
            if let Err(GitHubError::NoToken) = &client {
                missing.push(TOKEN_ENV_VAR.to_string());
            }

            let reason = if missing.is_empty() {
                [repo.err(), client.err()]
                    .into_iter()
                    .flatten()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            } else {
                format!("missing {}", missing.join(", "))
            };
            Err(CommitError::Configuration(reason))
        }
    }
}

/// Recipe operations over a content store and an optional publisher.
#[derive(Debug)]
pub struct RecipeService<A> {
    store: RecipeStore,
    publisher: Result<Committer<A>, String>,
}

impl<A: GitDataApi> RecipeService<A> {
    /// Create a service. A publisher error is kept and reported by
    /// [`Self::commit`]; reads and drafts still work.
    pub fn new(store: RecipeStore, publisher: Result<Committer<A>, CommitError>) -> Self {
        Self {
            store,
            publisher: publisher.map_err(|e| match e {
                CommitError::Configuration(reason) => reason,
                other => other.to_string(),
            }),
        }
    }

    /// Whether commits can be published.
    pub const fn can_publish(&self) -> bool {
        self.publisher.is_ok()
    }

    /// The publisher, if configured.
    pub fn committer(&self) -> Option<&Committer<A>> {
        self.publisher.as_ref().ok()
    }

    /// Search recipes, most recently updated first.
    ///
    /// # Errors
    /// Returns error if the content directory can't be read.
    pub fn search(&self, params: &SearchParams) -> ServiceResult<SearchResults> {
        let recipes: Vec<RecipeResponse> = params
            .apply(self.store.load_all()?)
            .into_iter()
            .map(larder_core::Recipe::into_response)
            .collect();

        let non_blank = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());
        Ok(SearchResults {
            total: recipes.len(),
            recipes,
            query: non_blank(&params.query),
            tag: non_blank(&params.tag),
        })
    }

    /// Fetch one recipe.
    ///
    /// # Errors
    /// Returns a validation error for a blank or invalid slug, or not found.
    pub fn get(&self, slug: &str) -> ServiceResult<RecipeResponse> {
        if slug.trim().is_empty() {
            return Err(larder_core::Error::Validation("missing slug parameter".into()).into());
        }
        Ok(self.store.get(slug)?.into_response())
    }

    /// Tag counts over every recipe.
    ///
    /// # Errors
    /// Returns error if the content directory can't be read.
    pub fn tags(&self) -> ServiceResult<TagsIndex> {
        Ok(tags_index(&self.store.load_all()?))
    }

    /// Draft a new recipe.
    ///
    /// # Errors
    /// See [`draft::create`].
    pub fn create(&self, input: RecipeInput) -> ServiceResult<RecipeDraft> {
        Ok(draft::create(&self.store, input, &today())?)
    }

    /// Draft changes to a recipe.
    ///
    /// # Errors
    /// See [`draft::update`].
    pub fn update(&self, slug: &str, updates: RecipeUpdate) -> ServiceResult<RecipeDraft> {
        Ok(draft::update(&self.store, slug, updates, &today())?)
    }

    /// Draft a variation of a recipe.
    ///
    /// # Errors
    /// See [`draft::variation`].
    pub fn variation(&self, request: VariationRequest) -> ServiceResult<RecipeDraft> {
        Ok(draft::variation(&self.store, request, &today())?)
    }

    /// Publish files as one commit.
    ///
    /// # Errors
    /// - [`CommitError::Configuration`] if no publisher is configured
    /// - anything [`Committer::commit`] returns
    pub async fn commit(&self, request: CommitRequest) -> ServiceResult<CommitResponse> {
        let committer = self
            .publisher
            .as_ref()
            .map_err(|reason| CommitError::Configuration(reason.clone()))?;

        debug!(files = request.files.len(), "publishing commit");
        let outcome = committer.commit(&request.files, &request.message).await?;
        info!(sha = %outcome.sha, "commit published");

        Ok(CommitResponse {
            success: true,
            commit: CommitRef {
                sha: outcome.sha,
                url: outcome.url,
            },
            files: outcome.files,
            message: request.message,
        })
    }
}
