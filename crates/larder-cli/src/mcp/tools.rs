//! Tool catalogue and dispatch.

use larder_core::{Ingredient, RecipeInput, RecipeTimes, RecipeUpdate, SearchParams, VariationRequest};
use larder_github::{FileChange, GitDataApi};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::services::{CommitRequest, RecipeService, ServiceResult};

/// Arguments that don't fit a tool's input schema.
#[derive(Debug, thiserror::Error)]
#[error("invalid arguments for {tool}: {reason}")]
pub struct InvalidArguments {
    tool: String,
    reason: String,
}

/// Text block inside a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error,
        }
    }

    /// Pretty-printed JSON payload.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text, false),
            Err(e) => Self::error(&e),
        }
    }

    /// Failure payload, `Error: <message>`.
    pub fn error(message: &dyn std::fmt::Display) -> Self {
        Self::text(format!("Error: {message}"), true)
    }

    fn from_service<T: Serialize>(result: ServiceResult<T>) -> Self {
        match result {
            Ok(value) => Self::json(&value),
            Err(e) => Self::error(&e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetRecipeArgs {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct CreateRecipeArgs {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    servings: Option<u32>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    prep_minutes: Option<u32>,
    #[serde(default)]
    cook_minutes: Option<u32>,
    #[serde(default)]
    ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    instructions: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateRecipeArgs {
    slug: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    servings: Option<u32>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    prep_minutes: Option<u32>,
    #[serde(default)]
    cook_minutes: Option<u32>,
    #[serde(default)]
    ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    instructions: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateVariationArgs {
    source_slug: String,
    new_title: String,
    #[serde(default)]
    new_slug: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    instructions: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImportArgs {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CommitChangesArgs {
    files: Vec<FileChange>,
    message: String,
}

/// Prep and cook minutes as recipe times; `None` when both are absent.
fn minutes_to_times(prep: Option<u32>, cook: Option<u32>) -> Option<RecipeTimes> {
    (prep.is_some() || cook.is_some()).then_some(RecipeTimes {
        prep_minutes: prep,
        cook_minutes: cook,
        total_minutes: None,
    })
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, InvalidArguments> {
    serde_json::from_value(arguments).map_err(|e| InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Run one tool.
///
/// Unknown tools and failed operations produce an error payload; only
/// arguments that don't match the schema are a protocol error.
///
/// # Errors
/// Returns [`InvalidArguments`] if `arguments` doesn't fit the tool.
pub async fn call<A: GitDataApi>(
    service: &RecipeService<A>,
    name: &str,
    arguments: Value,
) -> Result<ToolResult, InvalidArguments> {
    debug!(tool = name, "tool call");

    let result = match name {
        "search_recipes" => {
            let params: SearchParams = parse_args(name, arguments)?;
            ToolResult::from_service(service.search(&params))
        }
        "get_recipe" => {
            let args: GetRecipeArgs = parse_args(name, arguments)?;
            ToolResult::from_service(service.get(&args.slug))
        }
        "list_tags" => ToolResult::from_service(service.tags()),
        "create_recipe" => {
            let args: CreateRecipeArgs = parse_args(name, arguments)?;
            let input = RecipeInput {
                title: args.title,
                slug: args.slug,
                description: args.description,
                servings: args.servings,
                source_url: args.source_url,
                tags: args.tags,
                times: minutes_to_times(args.prep_minutes, args.cook_minutes),
                ingredients: args.ingredients,
                instructions: args.instructions,
                notes: args.notes,
                body: None,
            };
            ToolResult::from_service(service.create(input))
        }
        "update_recipe" => {
            let args: UpdateRecipeArgs = parse_args(name, arguments)?;
            let updates = RecipeUpdate {
                title: args.title,
                description: args.description,
                servings: args.servings,
                source_url: args.source_url,
                tags: args.tags,
                times: minutes_to_times(args.prep_minutes, args.cook_minutes),
                ingredients: args.ingredients,
                instructions: args.instructions,
                notes: args.notes,
                body: None,
            };
            ToolResult::from_service(service.update(&args.slug, updates))
        }
        "create_variation" => {
            let args: CreateVariationArgs = parse_args(name, arguments)?;
            let request = VariationRequest {
                source_slug: args.source_slug,
                new_title: args.new_title,
                new_slug: args.new_slug,
                modifications: RecipeUpdate {
                    description: args.description,
                    tags: args.tags,
                    ingredients: args.ingredients,
                    instructions: args.instructions,
                    notes: args.notes,
                    ..RecipeUpdate::default()
                },
            };
            ToolResult::from_service(service.variation(request))
        }
        "import_recipe_from_url" => {
            let args: ImportArgs = parse_args(name, arguments)?;
            ToolResult::json(&json!({
                "error": "Not implemented",
                "message": format!(
                    "Recipe import from URL is not yet implemented. URL: {}",
                    args.url
                ),
                "suggestion": "Use create_recipe with manually extracted data instead.",
            }))
        }
        "commit_changes" => {
            let args: CommitChangesArgs = parse_args(name, arguments)?;
            let request = CommitRequest {
                files: args.files,
                message: args.message,
            };
            ToolResult::from_service(service.commit(request).await)
        }
        other => ToolResult::error(&format!("Unknown tool: {other}")),
    };

    Ok(result)
}

fn ingredients_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "item": { "type": "string" },
                "amount": { "type": "string" },
                "note": { "type": "string" }
            },
            "required": ["item"]
        },
        "description": "List of ingredients"
    })
}

fn string_list(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

/// Every tool with its input schema, as returned by `tools/list`.
pub fn definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "search_recipes",
            "description": "Search recipes by query text or filter by tag. Returns a list of matching recipes.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query (searches title, description, ingredients)" },
                    "tag": { "type": "string", "description": "Filter by specific tag" },
                    "limit": { "type": "number", "description": "Maximum number of results" }
                }
            }
        }),
        json!({
            "name": "get_recipe",
            "description": "Get full details of a specific recipe by its slug.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "slug": { "type": "string", "description": "Recipe slug (URL-friendly identifier)" }
                },
                "required": ["slug"]
            }
        }),
        json!({
            "name": "create_recipe",
            "description": "Create a new recipe. Returns the recipe data and file info for committing.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Recipe title" },
                    "slug": { "type": "string", "description": "URL slug, derived from the title if omitted" },
                    "description": { "type": "string", "description": "Short description" },
                    "servings": { "type": "number", "description": "Number of servings" },
                    "source_url": { "type": "string", "description": "Original source URL" },
                    "tags": string_list("Tags like \"dinner\", \"vegetarian\""),
                    "prep_minutes": { "type": "number", "description": "Prep time in minutes" },
                    "cook_minutes": { "type": "number", "description": "Cook time in minutes" },
                    "ingredients": ingredients_schema(),
                    "instructions": string_list("Step-by-step instructions"),
                    "notes": { "type": "string", "description": "Additional notes or tips" }
                },
                "required": ["title"]
            }
        }),
        json!({
            "name": "update_recipe",
            "description": "Update an existing recipe. Only provide fields you want to change.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "slug": { "type": "string", "description": "Recipe slug to update" },
                    "title": { "type": "string", "description": "New title" },
                    "description": { "type": "string", "description": "New description" },
                    "servings": { "type": "number", "description": "Number of servings" },
                    "source_url": { "type": "string", "description": "Original source URL" },
                    "tags": string_list("Tags"),
                    "prep_minutes": { "type": "number", "description": "Prep time in minutes" },
                    "cook_minutes": { "type": "number", "description": "Cook time in minutes" },
                    "ingredients": ingredients_schema(),
                    "instructions": string_list("Step-by-step instructions"),
                    "notes": { "type": "string" }
                },
                "required": ["slug"]
            }
        }),
        json!({
            "name": "create_variation",
            "description": "Create a variation of an existing recipe with modifications.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "source_slug": { "type": "string", "description": "Slug of recipe to base variation on" },
                    "new_title": { "type": "string", "description": "Title for the variation" },
                    "new_slug": { "type": "string", "description": "Slug for the variation, derived from the title if omitted" },
                    "description": { "type": "string", "description": "Description for variation" },
                    "tags": string_list("Tags"),
                    "ingredients": ingredients_schema(),
                    "instructions": string_list("Modified instructions"),
                    "notes": { "type": "string", "description": "Notes about what changed" }
                },
                "required": ["source_slug", "new_title"]
            }
        }),
        json!({
            "name": "import_recipe_from_url",
            "description": "Import a recipe from an external URL. (Placeholder, not yet implemented)",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "URL of the recipe to import" }
                },
                "required": ["url"]
            }
        }),
        json!({
            "name": "list_tags",
            "description": "Get all tags used across recipes with their counts.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "commit_changes",
            "description": "Commit pending recipe changes to git. Call this after create/update operations.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string" },
                                "content": { "type": "string" }
                            },
                            "required": ["path", "content"]
                        },
                        "description": "Files to commit"
                    },
                    "message": { "type": "string", "description": "Commit message" }
                },
                "required": ["files", "message"]
            }
        }),
    ]
}
