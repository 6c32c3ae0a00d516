//! Canonical tag catalogue.
//!
//! Tags outside the catalogue are allowed; they are reported as
//! uncategorized.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::recipe::{Recipe, TagCount, TagsIndex};

/// Category name and its tags, in display order.
pub const CANONICAL_TAGS: &[(&str, &[&str])] = &[
    (
        "meal",
        &["breakfast", "lunch", "dinner", "snack", "dessert", "appetizer", "side"],
    ),
    (
        "cuisine",
        &[
            "italian",
            "mexican",
            "asian",
            "indian",
            "mediterranean",
            "american",
            "french",
            "thai",
            "japanese",
            "chinese",
        ],
    ),
    (
        "diet",
        &["vegetarian", "vegan", "gluten-free", "dairy-free", "keto", "paleo", "low-carb"],
    ),
    (
        "method",
        &["baked", "grilled", "fried", "slow-cooker", "instant-pot", "no-cook", "one-pot"],
    ),
    (
        "time",
        &["quick", "30-minutes", "weeknight", "meal-prep", "make-ahead"],
    ),
    ("season", &["spring", "summer", "fall", "winter", "holiday"]),
];

/// Every canonical tag.
pub fn canonical_tags() -> impl Iterator<Item = &'static str> {
    CANONICAL_TAGS.iter().flat_map(|(_, tags)| tags.iter().copied())
}

/// Whether `tag` is in the catalogue (case-insensitive).
#[must_use]
pub fn is_canonical(tag: &str) -> bool {
    tag_category(tag).is_some()
}

/// Category of a canonical tag.
#[must_use]
pub fn tag_category(tag: &str) -> Option<&'static str> {
    let tag = tag.to_lowercase();
    CANONICAL_TAGS
        .iter()
        .find(|(_, tags)| tags.contains(&tag.as_str()))
        .map(|(category, _)| *category)
}

/// A tag index split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorizedTags {
    /// Every category is present, possibly empty.
    pub categorized: BTreeMap<String, Vec<TagCount>>,
    pub uncategorized: Vec<TagCount>,
}

/// Sort an index into categories, keeping index order within each.
#[must_use]
pub fn categorize(index: &TagsIndex) -> CategorizedTags {
    let mut out = CategorizedTags {
        categorized: CANONICAL_TAGS
            .iter()
            .map(|(category, _)| ((*category).to_string(), Vec::new()))
            .collect(),
        uncategorized: Vec::new(),
    };

    for tag in &index.tags {
        match tag_category(&tag.tag).and_then(|c| out.categorized.get_mut(c)) {
            Some(bucket) => bucket.push(tag.clone()),
            None => out.uncategorized.push(tag.clone()),
        }
    }
    out
}

/// Canonical tags mentioned in a recipe's title, description or
/// ingredients, in catalogue order.
#[must_use]
pub fn suggest_tags(recipe: &Recipe) -> Vec<&'static str> {
    let text = std::iter::once(recipe.title.as_str())
        .chain(std::iter::once(recipe.description.as_str()))
        .chain(recipe.ingredients.iter().map(|i| i.item.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    canonical_tags().filter(|tag| text.contains(tag)).collect()
}
