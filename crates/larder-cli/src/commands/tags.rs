//! `larder tags` command - Show tag usage grouped by category.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use larder_core::TagCount;
use larder_core::tags::{categorize, suggest_tags};
use larder_github::GitDataApi;

use crate::commands::utils;
use crate::output;
use crate::services::RecipeService;

/// Run the tags command.
pub fn run(config_path: &Path, suggest: Option<&str>, json: bool) -> Result<()> {
    let config = utils::load_config(config_path)?;
    let service = utils::open_service(&config);

    if let Some(slug) = suggest {
        return run_suggest(&service, slug, json);
    }

    let index = service.tags()?;

    if json {
        output::essential(&serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    if index.tags.is_empty() {
        output::info("No tags yet");
        return Ok(());
    }

    let width = index.tags.iter().map(|t| t.tag.len()).max().unwrap_or(0);
    let split = categorize(&index);

    for (category, tags) in &split.categorized {
        print_group(category, tags, width);
    }
    print_group("other", &split.uncategorized, width);

    output::hr();
    output::detail(&format!("{} tag(s)", index.total));
    Ok(())
}

/// Catalogue tags the recipe mentions but doesn't carry yet.
fn run_suggest<A: GitDataApi>(service: &RecipeService<A>, slug: &str, json: bool) -> Result<()> {
    let recipe = service.get(slug)?.recipe;
    let missing: Vec<&str> = suggest_tags(&recipe)
        .into_iter()
        .filter(|tag| !recipe.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
        .collect();

    if json {
        output::essential(&serde_json::to_string_pretty(&missing)?);
    } else if missing.is_empty() {
        output::info(&format!("No new tags to suggest for {slug}"));
    } else {
        for tag in missing {
            output::essential(tag);
        }
    }
    Ok(())
}

fn print_group(name: &str, tags: &[TagCount], width: usize) {
    if tags.is_empty() {
        return;
    }
    output::detail(&name.bold().to_string());
    for tag in tags {
        output::essential(&format!("  {}", output::tag_line(&tag.tag, tag.count, width)));
    }
}
