//! # larder-core
//!
//! Core library for Larder: the recipe model, the on-disk content store,
//! search and tags, and drafting of recipe changes for publishing.

pub mod config;
pub mod draft;
pub mod error;
pub mod markdown;
pub mod recipe;
pub mod search;
pub mod slug;
pub mod store;
pub mod tags;

pub use config::Config;
pub use draft::{RecipeDraft, SourceRef, VariationRequest};
pub use error::{Error, Result};
pub use markdown::{parse_recipe, render_recipe};
pub use recipe::{
    Ingredient, RawRecipe, Recipe, RecipeInput, RecipeResponse, RecipeTimes, RecipeUpdate,
    TagCount, TagsIndex, Times, today,
};
pub use search::{SearchParams, filter_by_tag, search, tags_index};
pub use slug::{Slug, slugify};
pub use store::{RecipeStore, recipe_path};
