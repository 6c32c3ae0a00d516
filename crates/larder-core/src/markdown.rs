//! Recipe files: YAML front matter followed by a markdown body.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::recipe::{DEFAULT_SERVINGS, Ingredient, RawRecipe, Recipe, RecipeTimes};

const DELIMITER: &str = "---";

/// Split `text` into its YAML front matter and body.
///
/// Returns `None` when the text does not open with a `---` line or the
/// front matter is never closed.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let (yaml, after) = if let Some(after) = rest.strip_prefix(DELIMITER) {
        ("", after)
    } else {
        let end = rest.find("\n---")?;
        (&rest[..end], &rest[end + 4..])
    };

    // Whatever follows the closing delimiter on its line is not body.
    let body = after.find('\n').map_or("", |i| &after[i + 1..]);
    Some((yaml, body))
}

/// Parse a recipe file stored under `slug`.
///
/// # Errors
/// Returns [`Error::Parse`] if the front matter is missing, is not valid
/// YAML, or has no title.
pub fn parse_recipe(slug: &str, text: &str, today: &str) -> Result<Recipe> {
    let parse_error = |message: String| Error::Parse {
        file: PathBuf::from(crate::store::recipe_path(slug)),
        message,
    };

    let (yaml, body) =
        split_front_matter(text).ok_or_else(|| parse_error("missing front matter".into()))?;

    let mut raw: RawRecipe =
        serde_yaml::from_str(yaml).map_err(|e| parse_error(e.to_string()))?;

    if raw.title.trim().is_empty() {
        return Err(parse_error("title is required".into()));
    }

    raw.slug = slug.to_string();
    raw.body = Some(body.trim().to_string());

    Ok(Recipe::normalize(raw, today))
}

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    times: Option<RecipeTimes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredients: Option<&'a [Ingredient]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    created_at: &'a str,
    updated_at: &'a str,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn non_empty_list<T>(list: &[T]) -> Option<&[T]> {
    (!list.is_empty()).then_some(list)
}

impl<'a> FrontMatter<'a> {
    fn of(recipe: &'a Recipe) -> Self {
        let t = recipe.times;
        let times = (t.prep_minutes > 0 || t.cook_minutes > 0 || t.total_minutes > 0).then(|| {
            RecipeTimes {
                prep_minutes: (t.prep_minutes > 0).then_some(t.prep_minutes),
                cook_minutes: (t.cook_minutes > 0).then_some(t.cook_minutes),
                total_minutes: (t.total_minutes != t.prep_minutes + t.cook_minutes)
                    .then_some(t.total_minutes),
            }
        });

        Self {
            title: &recipe.title,
            description: non_empty(&recipe.description),
            servings: (recipe.servings != DEFAULT_SERVINGS).then_some(recipe.servings),
            source_url: non_empty(&recipe.source_url),
            tags: non_empty_list(&recipe.tags),
            times,
            ingredients: non_empty_list(&recipe.ingredients),
            instructions: non_empty_list(&recipe.instructions),
            notes: non_empty(&recipe.notes),
            created_at: &recipe.created_at,
            updated_at: &recipe.updated_at,
        }
    }
}

/// Render a recipe as a file: front matter without defaulted fields, then
/// the body.
///
/// # Errors
/// Returns [`Error::Yaml`] if serialization fails.
pub fn render_recipe(recipe: &Recipe) -> Result<String> {
    let yaml = serde_yaml::to_string(&FrontMatter::of(recipe))?;

    let mut out = format!("{DELIMITER}\n{yaml}{DELIMITER}\n");
    if !recipe.body.is_empty() {
        out.push('\n');
        out.push_str(&recipe.body);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recipe::Times;

    const TODAY: &str = "2025-06-01";

    const SAMPLE: &str = "---
title: Lemon Tart
description: Sharp and sweet
servings: 8
tags: [dessert, baked]
times:
  prep_minutes: 30
  cook_minutes: 40
ingredients:
  - item: lemons
    amount: '4'
  - item: butter
instructions:
  - Make the crust
  - Fill and bake
created_at: 2024-11-02
updated_at: 2025-01-15
---

Best the day after.
";

    #[test]
    fn test_parse_full_recipe() {
        let recipe = parse_recipe("lemon-tart", SAMPLE, TODAY).unwrap();

        assert_eq!(recipe.slug, "lemon-tart");
        assert_eq!(recipe.title, "Lemon Tart");
        assert_eq!(recipe.servings, 8);
        assert_eq!(recipe.tags, vec!["dessert", "baked"]);
        assert_eq!(recipe.times.total_minutes, 70);
        assert_eq!(recipe.ingredients[0], Ingredient::new("lemons").amount("4"));
        assert_eq!(recipe.ingredients[1].amount, None);
        assert_eq!(recipe.created_at, "2024-11-02");
        assert_eq!(recipe.updated_at, "2025-01-15");
        assert_eq!(recipe.body, "Best the day after.");
    }

    #[test]
    fn test_parse_minimal_recipe() {
        let recipe = parse_recipe("toast", "---\ntitle: Toast\n---\n", TODAY).unwrap();

        assert_eq!(recipe.title, "Toast");
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.created_at, TODAY);
        assert_eq!(recipe.body, "");
    }

    #[test]
    fn test_parse_ignores_slug_in_front_matter() {
        let text = "---\ntitle: Toast\nslug: elsewhere\n---\n";
        let recipe = parse_recipe("toast", text, TODAY).unwrap();
        assert_eq!(recipe.slug, "toast");
    }

    #[test]
    fn test_parse_errors() {
        for text in [
            "no front matter",
            "---\ntitle: Unclosed\n",
            "---\ndescription: no title\n---\n",
            "---\ntitle: '   '\n---\n",
            "---\ntitle: [unterminated\n---\n",
        ] {
            let err = parse_recipe("x", text, TODAY).unwrap_err();
            assert!(matches!(err, Error::Parse { .. }), "text: {text:?}");
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_recipe("pho", "nope", TODAY).unwrap_err();
        assert!(err.to_string().contains("content/recipes/pho/index.md"));
    }

    #[test]
    fn test_render_omits_defaults() {
        let text = render_recipe(&parse_recipe("toast", "---\ntitle: Toast\n---\n", TODAY).unwrap())
            .unwrap();

        assert!(text.starts_with("---\ntitle: Toast\n"));
        assert!(text.contains("created_at:"));
        assert!(text.contains("updated_at:"));
        for absent in ["description", "servings", "tags", "times", "ingredients", "notes"] {
            assert!(!text.contains(absent), "unexpected {absent} in {text}");
        }
        assert!(text.ends_with("---\n"));
    }

    #[test]
    fn test_render_times_total_only_when_overridden() {
        let mut recipe = parse_recipe("x", "---\ntitle: X\n---\n", TODAY).unwrap();
        recipe.times = Times {
            prep_minutes: 5,
            cook_minutes: 10,
            total_minutes: 15,
        };
        let text = render_recipe(&recipe).unwrap();
        assert!(text.contains("prep_minutes: 5"));
        assert!(!text.contains("total_minutes"));

        recipe.times.total_minutes = 60;
        let text = render_recipe(&recipe).unwrap();
        assert!(text.contains("total_minutes: 60"));
    }

    #[test]
    fn test_render_then_parse_preserves_recipe() {
        let recipe = parse_recipe("lemon-tart", SAMPLE, TODAY).unwrap();
        let text = render_recipe(&recipe).unwrap();

        assert!(text.ends_with("\nBest the day after.\n"));
        assert_eq!(parse_recipe("lemon-tart", &text, "1999-01-01").unwrap(), recipe);
    }
}
