//! Directory-backed recipe collection.
//!
//! Recipes live at `content/recipes/<slug>/index.md` under a content root,
//! which is normally a checkout of the published repository.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::markdown::parse_recipe;
use crate::recipe::{Recipe, today};
use crate::slug::Slug;

/// Recipes directory relative to the content root.
pub const RECIPES_DIR: &str = "content/recipes";

/// Recipe file name inside a slug directory.
pub const RECIPE_FILE: &str = "index.md";

/// Repository-relative path of a recipe file.
#[must_use]
pub fn recipe_path(slug: &str) -> String {
    format!("{RECIPES_DIR}/{slug}/{RECIPE_FILE}")
}

/// Read access to the recipes under a content root.
#[derive(Debug, Clone)]
pub struct RecipeStore {
    root: PathBuf,
}

impl RecipeStore {
    /// Open the store rooted at `root`. The directory need not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn recipes_dir(&self) -> PathBuf {
        self.root.join(RECIPES_DIR)
    }

    /// Every recipe directory name, sorted.
    ///
    /// # Errors
    /// Returns error if the recipes directory exists but can't be read.
    pub fn slugs(&self) -> Result<Vec<String>> {
        let dir = self.recipes_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut slugs = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                slugs.push(name.to_string());
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Whether a recipe exists under `slug`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an invalid slug.
    pub fn exists(&self, slug: &str) -> Result<bool> {
        let slug = Slug::new(slug)?;
        Ok(self.file_path(&slug).is_file())
    }

    fn file_path(&self, slug: &Slug) -> PathBuf {
        self.recipes_dir().join(slug.as_str()).join(RECIPE_FILE)
    }

    /// Load one recipe; `None` if it doesn't exist.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an invalid slug, [`Error::Parse`] for
    /// a malformed file, or an IO error.
    pub fn load(&self, slug: &str) -> Result<Option<Recipe>> {
        let slug = Slug::new(slug)?;
        let path = self.file_path(&slug);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        parse_recipe(&slug, &text, &today()).map(Some)
    }

    /// Load one recipe, failing if it doesn't exist.
    ///
    /// # Errors
    /// As [`Self::load`], plus [`Error::NotFound`].
    pub fn get(&self, slug: &str) -> Result<Recipe> {
        self.load(slug)?
            .ok_or_else(|| Error::NotFound(slug.to_string()))
    }

    /// Load every recipe, most recently updated first.
    ///
    /// Directories without a recipe file or with a malformed one are skipped.
    ///
    /// # Errors
    /// Returns error if the recipes directory can't be listed.
    pub fn load_all(&self) -> Result<Vec<Recipe>> {
        let mut recipes = Vec::new();

        for slug in self.slugs()? {
            match self.load(&slug) {
                Ok(Some(recipe)) => recipes.push(recipe),
                Ok(None) => debug!(slug = %slug, "no recipe file, skipping"),
                Err(e) => warn!(slug = %slug, error = %e, "skipping unreadable recipe"),
            }
        }

        recipes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(recipes)
    }
}
