//! Recipe data model.
//!
//! Recipes are stored as [`RawRecipe`] front matter where almost everything
//! is optional, and handled everywhere else as a fully populated [`Recipe`].

use serde::{Deserialize, Serialize};

/// Servings assumed when a recipe doesn't say.
pub const DEFAULT_SERVINGS: u32 = 4;

/// One ingredient line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Ingredient {
    /// Create an ingredient with no amount or note.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            amount: None,
            note: None,
        }
    }

    /// Set the amount.
    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}

/// Times as written by an author; any may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_minutes: Option<u32>,
}

impl RecipeTimes {
    /// Layer these times over `base`.
    ///
    /// Fields given here win. When prep or cook changes and no total is
    /// given, the total is dropped so it is recomputed from the parts.
    #[must_use]
    pub fn over(self, base: Times) -> Self {
        let parts_changed = self.prep_minutes.is_some() || self.cook_minutes.is_some();
        let total = self
            .total_minutes
            .or_else(|| (!parts_changed).then_some(base.total_minutes));

        Self {
            prep_minutes: Some(self.prep_minutes.unwrap_or(base.prep_minutes)),
            cook_minutes: Some(self.cook_minutes.unwrap_or(base.cook_minutes)),
            total_minutes: total,
        }
    }
}

/// Normalized times; total defaults to prep plus cook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Times {
    pub prep_minutes: u32,
    pub cook_minutes: u32,
    pub total_minutes: u32,
}

impl From<RecipeTimes> for Times {
    fn from(times: RecipeTimes) -> Self {
        let prep = times.prep_minutes.unwrap_or(0);
        let cook = times.cook_minutes.unwrap_or(0);
        Self {
            prep_minutes: prep,
            cook_minutes: cook,
            total_minutes: times.total_minutes.unwrap_or(prep + cook),
        }
    }
}

impl From<Times> for RecipeTimes {
    fn from(times: Times) -> Self {
        Self {
            prep_minutes: Some(times.prep_minutes),
            cook_minutes: Some(times.cook_minutes),
            total_minutes: Some(times.total_minutes),
        }
    }
}

/// A recipe exactly as stored in front matter.
///
/// `slug` comes from the directory name and `body` from the markdown after
/// the front matter; neither is read from the YAML itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecipe {
    pub title: String,

    #[serde(skip)]
    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub times: Option<RecipeTimes>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(skip)]
    pub body: Option<String>,
}

/// A recipe with every field populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub servings: u32,
    pub source_url: String,
    pub tags: Vec<String>,
    pub times: Times,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
}

impl Recipe {
    /// Fill in defaults for everything `raw` leaves out.
    ///
    /// Missing dates become `today` (`YYYY-MM-DD`).
    #[must_use]
    pub fn normalize(raw: RawRecipe, today: &str) -> Self {
        Self {
            title: raw.title,
            slug: raw.slug,
            description: raw.description.unwrap_or_default(),
            servings: raw.servings.unwrap_or(DEFAULT_SERVINGS),
            source_url: raw.source_url.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            times: raw.times.unwrap_or_default().into(),
            ingredients: raw.ingredients.unwrap_or_default(),
            instructions: raw.instructions.unwrap_or_default(),
            notes: raw.notes.unwrap_or_default(),
            created_at: raw.created_at.unwrap_or_else(|| today.to_string()),
            updated_at: raw.updated_at.unwrap_or_else(|| today.to_string()),
            body: raw.body.unwrap_or_default(),
        }
    }

    /// Site path of this recipe.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/recipes/{}", self.slug)
    }

    /// Attach the site path for API output.
    #[must_use]
    pub fn into_response(self) -> RecipeResponse {
        RecipeResponse {
            url: self.url(),
            recipe: self,
        }
    }
}

/// A recipe as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeResponse {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub url: String,
}

/// Payload for creating a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeInput {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub servings: Option<u32>,
    pub source_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub times: Option<RecipeTimes>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<String>>,
    pub notes: Option<String>,
    pub body: Option<String>,
}

/// Partial changes to an existing recipe; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub servings: Option<u32>,
    pub source_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub times: Option<RecipeTimes>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<String>>,
    pub notes: Option<String>,
    pub body: Option<String>,
}

/// A tag and how many recipes carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Every tag in use, most used first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsIndex {
    pub tags: Vec<TagCount>,
    pub total: usize,
}

/// Today's date in UTC as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

/// Human-readable duration: `45 min`, `1 hr`, `1 hr 30 min`; empty for zero.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, 0) => String::new(),
        (0, mins) => format!("{mins} min"),
        (hours, 0) => format!("{hours} hr"),
        (hours, mins) => format!("{hours} hr {mins} min"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let raw = RawRecipe {
            title: "Toast".into(),
            slug: "toast".into(),
            ..RawRecipe::default()
        };

        let recipe = Recipe::normalize(raw, "2025-03-01");

        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.description, "");
        assert!(recipe.tags.is_empty());
        assert_eq!(recipe.times, Times::default());
        assert_eq!(recipe.created_at, "2025-03-01");
        assert_eq!(recipe.updated_at, "2025-03-01");
        assert_eq!(recipe.body, "");
    }

    #[test]
    fn test_total_defaults_to_prep_plus_cook() {
        let times: Times = RecipeTimes {
            prep_minutes: Some(10),
            cook_minutes: Some(25),
            total_minutes: None,
        }
        .into();
        assert_eq!(times.total_minutes, 35);

        let explicit: Times = RecipeTimes {
            prep_minutes: Some(10),
            cook_minutes: Some(25),
            total_minutes: Some(90),
        }
        .into();
        assert_eq!(explicit.total_minutes, 90);
    }

    #[test]
    fn test_times_over_recomputes_total_when_parts_change() {
        let base = Times {
            prep_minutes: 10,
            cook_minutes: 20,
            total_minutes: 60,
        };

        let kept: Times = RecipeTimes::default().over(base).into();
        assert_eq!(kept, base);

        let changed: Times = RecipeTimes {
            cook_minutes: Some(40),
            ..RecipeTimes::default()
        }
        .over(base)
        .into();
        assert_eq!(changed.prep_minutes, 10);
        assert_eq!(changed.cook_minutes, 40);
        assert_eq!(changed.total_minutes, 50);
    }

    #[test]
    fn test_response_url() {
        let raw = RawRecipe {
            title: "Pho".into(),
            slug: "pho".into(),
            ..RawRecipe::default()
        };
        let response = Recipe::normalize(raw, "2025-01-01").into_response();

        assert_eq!(response.url, "/recipes/pho");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["url"], "/recipes/pho");
        assert_eq!(json["slug"], "pho");
        assert_eq!(json["times"]["total_minutes"], 0);
    }

    #[test]
    fn test_input_title_defaults_empty() {
        let input: RecipeInput = serde_json::from_str(r#"{"servings": 2}"#).unwrap();
        assert_eq!(input.title, "");
        assert_eq!(input.servings, Some(2));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(60), "1 hr");
        assert_eq!(format_duration(95), "1 hr 35 min");
    }

    #[test]
    fn test_today_shape() {
        let today = today();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
