//! HTTP API under `/api`.
//!
//! Reads are public. Writes need `Authorization: Bearer <token>` matching
//! `RECIPE_AGENT_API_TOKEN`; with no token configured every write is
//! rejected.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use larder_core::{RecipeDraft, RecipeInput, RecipeResponse, RecipeUpdate, SearchParams, TagsIndex};
use larder_github::{CommitError, GitDataApi, SecretString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::services::{CommitRequest, CommitResponse, RecipeService, SearchResults, ServiceError};

/// Environment variable holding the bearer token for write endpoints.
pub const API_TOKEN_ENV_VAR: &str = "RECIPE_AGENT_API_TOKEN";

/// Shared handler state.
pub struct AppState<A> {
    pub service: Arc<RecipeService<A>>,
    pub api_token: Option<SecretString>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            api_token: self.api_token.clone(),
        }
    }
}

/// Read the write token from `RECIPE_AGENT_API_TOKEN`.
pub fn api_token_from_env() -> Option<SecretString> {
    std::env::var(API_TOKEN_ENV_VAR)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .map(SecretString::from)
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("GitHub not configured: {0}")]
    NotConfigured(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        use larder_core::Error as RecipeError;

        let message = err.to_string();
        match err {
            ServiceError::Recipe(RecipeError::Validation(_))
            | ServiceError::Commit(CommitError::Validation(_)) => Self::BadRequest(message),
            ServiceError::Recipe(RecipeError::NotFound(_)) => Self::NotFound(message),
            ServiceError::Recipe(RecipeError::AlreadyExists(_))
            | ServiceError::Commit(CommitError::Conflict { .. }) => Self::Conflict(message),
            ServiceError::Commit(CommitError::Configuration(reason)) => Self::NotConfigured(reason),
            ServiceError::Commit(CommitError::Remote { .. }) => {
                Self::Upstream(format!("Failed to commit: {message}"))
            }
            ServiceError::Recipe(_) => Self::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotConfigured(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            warn!(%status, error = %self, "request failed");
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<T, ApiError>;

fn authorize<A>(state: &AppState<A>, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = &state.api_token else {
        warn!("{API_TOKEN_ENV_VAR} not configured, rejecting write");
        return Err(ApiError::Unauthorized);
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected.expose_secret() => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        debug!(%rejection, "rejected request body");
        ApiError::BadRequest("Invalid JSON body".into())
    })
}

/// Creates the API router.
pub fn create_router<A: GitDataApi + 'static>(state: AppState<A>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/search-recipes", get(search_recipes::<A>))
        .route("/api/get-recipe", get(get_recipe::<A>))
        .route("/api/list-tags", get(list_tags::<A>))
        .route("/api/create-recipe", post(create_recipe::<A>))
        .route("/api/update-recipe", put(update_recipe::<A>))
        .route("/api/create-variation", post(create_variation::<A>))
        .route("/api/commit-recipes", post(commit_recipes::<A>))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn search_recipes<A: GitDataApi>(
    State(state): State<AppState<A>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResults>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.service.search(&params)?))
}

#[derive(Debug, Default, Deserialize)]
struct SlugQuery {
    slug: Option<String>,
}

async fn get_recipe<A: GitDataApi>(
    State(state): State<AppState<A>>,
    Query(query): Query<SlugQuery>,
) -> ApiResult<Json<RecipeResponse>> {
    let Some(slug) = query.slug.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("Missing slug parameter".into()));
    };
    Ok(Json(state.service.get(&slug)?))
}

async fn list_tags<A: GitDataApi>(State(state): State<AppState<A>>) -> ApiResult<Json<TagsIndex>> {
    Ok(Json(state.service.tags()?))
}

async fn create_recipe<A: GitDataApi>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
    body: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeDraft>)> {
    authorize(&state, &headers)?;
    let draft = state.service.create(json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(draft)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateBody {
    slug: String,
    updates: RecipeUpdate,
}

async fn update_recipe<A: GitDataApi>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> ApiResult<Json<RecipeDraft>> {
    authorize(&state, &headers)?;
    let UpdateBody { slug, updates } = json_body(body)?;
    Ok(Json(state.service.update(&slug, updates)?))
}

async fn create_variation<A: GitDataApi>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
    body: Result<Json<larder_core::VariationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeDraft>)> {
    authorize(&state, &headers)?;
    let draft = state.service.variation(json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(draft)))
}

async fn commit_recipes<A: GitDataApi>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
    body: Result<Json<CommitRequest>, JsonRejection>,
) -> ApiResult<Json<CommitResponse>> {
    authorize(&state, &headers)?;
    let request = json_body(body)?;
    Ok(Json(state.service.commit(request).await?))
}
