//! `larder serve` command - Run the recipe HTTP API.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::{API_TOKEN_ENV_VAR, AppState, api_token_from_env, create_router};
use crate::commands::utils;
use crate::output;

/// Run the serve command.
pub fn run(config_path: &Path, bind: Option<String>) -> Result<()> {
    let config = utils::load_config(config_path)?;
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());

    let service = utils::open_service(&config);
    if !service.can_publish() {
        output::warn("GitHub not configured; commit-recipes will fail until GIT_REPO_OWNER, GIT_REPO_NAME and GIT_PAT are set");
    }

    let api_token = api_token_from_env();
    if api_token.is_none() {
        output::warn(&format!("{API_TOKEN_ENV_VAR} not set; write endpoints will reject every request"));
    }

    let state = AppState {
        service: Arc::new(service),
        api_token,
    };
    let app = create_router(state);

    let rt = utils::runtime()?;
    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(%addr, "listening");
        output::success(&format!("Serving recipes on http://{addr}/api"));

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("Server error")
    })
}
