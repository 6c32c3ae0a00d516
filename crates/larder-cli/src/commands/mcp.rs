//! `larder mcp` command - Run the agent tool server on stdio.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::commands::utils;
use crate::mcp::McpServer;

/// Run the tool server until stdin closes.
///
/// Stdout carries protocol messages only; diagnostics go to stderr.
pub fn run(config_path: &Path) -> Result<()> {
    let config = utils::load_config(config_path)?;
    let server = McpServer::new(Arc::new(utils::open_service(&config)));

    utils::runtime()?.block_on(server.serve_stdio())
}
