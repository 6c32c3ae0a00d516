//! Drafting recipe changes.
//!
//! A draft is a rendered recipe file plus a commit message. Drafting never
//! writes anything; drafts are published by committing their files.

use serde::{Deserialize, Serialize};
use tracing::debug;

use larder_github::FileChange;

use crate::error::{Error, Result};
use crate::markdown::render_recipe;
use crate::recipe::{RawRecipe, Recipe, RecipeInput, RecipeResponse, RecipeUpdate};
use crate::slug::{Slug, slugify};
use crate::store::{RecipeStore, recipe_path};

/// The recipe a variation was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub slug: String,
    pub title: String,
}

/// A recipe change ready to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub recipe: RecipeResponse,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    pub file: FileChange,
    pub message: String,
}

impl RecipeDraft {
    fn new(recipe: Recipe, source: Option<SourceRef>, message: String) -> Result<Self> {
        let file = FileChange::new(recipe_path(&recipe.slug), render_recipe(&recipe)?);
        Ok(Self {
            recipe: recipe.into_response(),
            source,
            file,
            message,
        })
    }
}

/// Request to derive a new recipe from an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationRequest {
    pub source_slug: String,
    pub new_title: String,

    #[serde(default)]
    pub new_slug: Option<String>,

    /// Changes relative to the source; `title` is ignored in favour of
    /// `new_title`.
    #[serde(default)]
    pub modifications: RecipeUpdate,
}

/// Pick the slug for a new recipe and make sure it's free.
fn claim_slug(store: &RecipeStore, requested: Option<&str>, title: &str) -> Result<Slug> {
    let slug = match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => Slug::new(slug)?,
        None => Slug::new(slugify(title)).map_err(|_| {
            Error::Validation(format!("cannot derive a slug from title '{title}'"))
        })?,
    };

    if store.exists(&slug)? {
        return Err(Error::AlreadyExists(slug.into_inner()));
    }
    Ok(slug)
}

/// Overlay `changes` onto `base`, keeping the base identity and dates.
fn merge(base: &Recipe, changes: RecipeUpdate) -> RawRecipe {
    RawRecipe {
        title: changes.title.unwrap_or_else(|| base.title.clone()),
        slug: base.slug.clone(),
        description: Some(changes.description.unwrap_or_else(|| base.description.clone())),
        servings: Some(changes.servings.unwrap_or(base.servings)),
        source_url: Some(changes.source_url.unwrap_or_else(|| base.source_url.clone())),
        tags: Some(changes.tags.unwrap_or_else(|| base.tags.clone())),
        times: Some(changes.times.unwrap_or_default().over(base.times)),
        ingredients: Some(changes.ingredients.unwrap_or_else(|| base.ingredients.clone())),
        instructions: Some(changes.instructions.unwrap_or_else(|| base.instructions.clone())),
        notes: Some(changes.notes.unwrap_or_else(|| base.notes.clone())),
        created_at: Some(base.created_at.clone()),
        updated_at: Some(base.updated_at.clone()),
        body: Some(changes.body.unwrap_or_else(|| base.body.clone())),
    }
}

/// Draft a new recipe.
///
/// The slug is `input.slug` if given, otherwise derived from the title.
///
/// # Errors
/// - [`Error::Validation`] for a blank title or unusable slug
/// - [`Error::AlreadyExists`] if the slug is taken
pub fn create(store: &RecipeStore, input: RecipeInput, today: &str) -> Result<RecipeDraft> {
    if input.title.trim().is_empty() {
        return Err(Error::Validation("title is required".into()));
    }

    let slug = claim_slug(store, input.slug.as_deref(), &input.title)?;
    debug!(slug = %slug, "drafting new recipe");

    let raw = RawRecipe {
        title: input.title,
        slug: slug.into_inner(),
        description: input.description,
        servings: input.servings,
        source_url: input.source_url,
        tags: input.tags,
        times: input.times,
        ingredients: input.ingredients,
        instructions: input.instructions,
        notes: input.notes,
        created_at: Some(today.to_string()),
        updated_at: Some(today.to_string()),
        body: input.body,
    };

    let recipe = Recipe::normalize(raw, today);
    let message = format!("Add recipe: {}", recipe.title);
    RecipeDraft::new(recipe, None, message)
}

/// Draft changes to an existing recipe.
///
/// The slug and creation date never change; `updated_at` becomes `today`.
///
/// # Errors
/// - [`Error::Validation`] for a blank slug or title
/// - [`Error::NotFound`] if the recipe doesn't exist
pub fn update(
    store: &RecipeStore,
    slug: &str,
    updates: RecipeUpdate,
    today: &str,
) -> Result<RecipeDraft> {
    if slug.trim().is_empty() {
        return Err(Error::Validation("slug is required".into()));
    }
    if updates.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(Error::Validation("title cannot be blank".into()));
    }

    let existing = store.get(slug)?;
    debug!(slug = %existing.slug, "drafting recipe update");

    let mut raw = merge(&existing, updates);
    raw.updated_at = Some(today.to_string());

    let recipe = Recipe::normalize(raw, today);
    let message = format!("Update recipe: {}", recipe.title);
    RecipeDraft::new(recipe, None, message)
}

/// Draft a new recipe derived from an existing one.
///
/// Unmodified fields are copied from the source. Notes default to
/// `Variation of <source title>. <source notes>`.
///
/// # Errors
/// - [`Error::Validation`] for a blank source slug or title
/// - [`Error::NotFound`] if the source doesn't exist
/// - [`Error::AlreadyExists`] if the new slug is taken
pub fn variation(
    store: &RecipeStore,
    request: VariationRequest,
    today: &str,
) -> Result<RecipeDraft> {
    if request.source_slug.trim().is_empty() {
        return Err(Error::Validation("source_slug is required".into()));
    }
    if request.new_title.trim().is_empty() {
        return Err(Error::Validation("new_title is required".into()));
    }

    let source = store.get(&request.source_slug)?;
    let slug = claim_slug(store, request.new_slug.as_deref(), &request.new_title)?;
    debug!(slug = %slug, source = %source.slug, "drafting variation");

    let mut changes = request.modifications;
    changes.title = Some(request.new_title);
    changes.notes = Some(changes.notes.unwrap_or_else(|| {
        format!("Variation of {}. {}", source.title, source.notes)
            .trim()
            .to_string()
    }));

    let mut raw = merge(&source, changes);
    raw.slug = slug.into_inner();
    raw.created_at = Some(today.to_string());
    raw.updated_at = Some(today.to_string());

    let recipe = Recipe::normalize(raw, today);
    let message = format!(
        "Add variation: {} (based on {})",
        recipe.title, source.title
    );
    let source = SourceRef {
        slug: source.slug,
        title: source.title,
    };
    RecipeDraft::new(recipe, Some(source), message)
}
