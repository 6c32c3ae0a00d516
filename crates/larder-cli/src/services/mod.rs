//! Service layer for business logic with dependency injection.
//!
//! Services accept the trait-based remote so the HTTP API, the tool server
//! and the CLI can all be tested against the in-memory object store.

pub mod recipes;
#[cfg(test)]
pub mod test_support;

pub use recipes::{
    CommitRequest, CommitResponse, RecipeService, SearchResults, ServiceError, ServiceResult,
    github_committer,
};
