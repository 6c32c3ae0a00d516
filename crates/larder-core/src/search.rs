//! Search, tag filtering and the tag index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::recipe::{Recipe, TagCount, TagsIndex};

/// Case-insensitive substring match over title, description, tags and
/// ingredient items. A blank query matches everything.
#[must_use]
pub fn search(recipes: Vec<Recipe>, query: &str) -> Vec<Recipe> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return recipes;
    }

    recipes
        .into_iter()
        .filter(|r| matches_query(r, &q))
        .collect()
}

fn matches_query(recipe: &Recipe, q: &str) -> bool {
    recipe.title.to_lowercase().contains(q)
        || recipe.description.to_lowercase().contains(q)
        || recipe.tags.iter().any(|t| t.to_lowercase().contains(q))
        || recipe
            .ingredients
            .iter()
            .any(|i| i.item.to_lowercase().contains(q))
}

/// Recipes carrying `tag`, compared case-insensitively.
#[must_use]
pub fn filter_by_tag(recipes: Vec<Recipe>, tag: &str) -> Vec<Recipe> {
    let tag = tag.to_lowercase();
    recipes
        .into_iter()
        .filter(|r| r.tags.iter().any(|t| t.to_lowercase() == tag))
        .collect()
}

/// Count recipes per lowercased tag, most used first, ties by name.
#[must_use]
pub fn tags_index(recipes: &[Recipe]) -> TagsIndex {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for tag in recipes.iter().flat_map(|r| &r.tags) {
        *counts.entry(tag.to_lowercase()).or_default() += 1;
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));

    TagsIndex {
        total: tags.len(),
        tags,
    }
}

/// Search parameters shared by every front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[serde(alias = "q")]
    pub query: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<usize>,
}

impl SearchParams {
    /// Apply query, then tag, then limit. Blank strings and a zero limit are
    /// ignored.
    #[must_use]
    pub fn apply(&self, mut recipes: Vec<Recipe>) -> Vec<Recipe> {
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            recipes = search(recipes, query);
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            recipes = filter_by_tag(recipes, tag);
        }
        if let Some(limit) = self.limit.filter(|&l| l > 0) {
            recipes.truncate(limit);
        }
        recipes
    }
}
