//! Larder CLI - recipe content API and atomic GitHub publisher.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod commands;
mod mcp;
mod output;
mod services;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Stderr only: stdout belongs to command output and the tool protocol.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("larder={log_level},larder_core={log_level},larder_github={log_level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    output::set_quiet(cli.quiet);

    let config = cli.config.as_path();
    let result = match cli.command {
        Commands::Serve { bind } => commands::serve::run(config, bind),
        Commands::Mcp => commands::mcp::run(config),
        Commands::Commit { paths, message } => commands::commit::run(config, &paths, &message),
        Commands::Tags { suggest, json } => commands::tags::run(config, suggest.as_deref(), json),
        Commands::Search {
            query,
            tag,
            limit,
            json,
        } => commands::search::run(config, query, tag, limit, json),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
