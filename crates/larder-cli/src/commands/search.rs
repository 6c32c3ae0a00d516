//! `larder search` command - Find recipes by text and tag.

use std::path::Path;

use anyhow::Result;
use larder_core::SearchParams;

use crate::commands::utils;
use crate::output;

/// Run the search command.
pub fn run(
    config_path: &Path,
    query: Option<String>,
    tag: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = utils::load_config(config_path)?;
    let service = utils::open_service(&config);

    let params = SearchParams { query, tag, limit };
    let results = service.search(&params)?;

    if json {
        output::essential(&serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.recipes.is_empty() {
        output::info("No recipes found");
        return Ok(());
    }

    for recipe in &results.recipes {
        output::essential(&output::recipe_line(&recipe.recipe));
    }
    output::hr();
    output::detail(&format!("{} recipe(s)", results.total));
    Ok(())
}
