//! CLI command definitions and implementations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commit;
pub mod mcp;
pub mod search;
pub mod serve;
pub mod tags;
pub mod utils;

/// Larder - recipe content API and publisher.
#[derive(Parser)]
#[command(name = "larder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file.
    #[arg(long, global = true, default_value = larder_core::config::CONFIG_FILE)]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress informational output; errors and results are still printed.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the recipe HTTP API.
    Serve {
        /// Address to listen on (overrides `[server] bind`).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run the agent tool server on stdin/stdout.
    Mcp,

    /// Publish local files as one commit on the configured branch.
    Commit {
        /// Files to publish, relative to the content directory.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Commit message.
        #[arg(short, long)]
        message: String,
    },

    /// List tags with recipe counts.
    Tags {
        /// Suggest catalogue tags for this recipe instead.
        #[arg(long, value_name = "SLUG")]
        suggest: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search recipes by text and tag.
    Search {
        /// Text to match against title, description, ingredients and tags.
        query: Option<String>,

        /// Only recipes carrying this tag.
        #[arg(short, long)]
        tag: Option<String>,

        /// Maximum number of results.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
