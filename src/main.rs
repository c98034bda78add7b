// ABOUTME: Entry point for the webapp-deploy CLI application.
// ABOUTME: Runs one deployment from the command line, or serves lifecycle events when hosted.

mod cli;
mod commands;

use clap::{CommandFactory, Parser};
use cli::Cli;
use tracing_subscriber::EnvFilter;
use webapp_deploy::output::{Output, OutputMode};

#[tokio::main]
async fn main() {
    if std::env::var_os(commands::RUNTIME_API_VAR).is_some() {
        // Cloud log ingestion expects one JSON object per line and no colors.
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter("info"))
            .with_ansi(false)
            .with_target(true)
            .init();

        if let Err(e) = commands::serve().await {
            tracing::error!("Event loop failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let Some(artifact) = cli.artifact.as_deref() else {
        eprintln!("Missing argument with storage path of artifact file");
        eprintln!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    let output = Output::new(OutputMode::from_flags(cli.quiet, cli.json));
    let mode = output.mode();
    if let Err(e) = commands::deploy(artifact, cli.config.as_deref(), output).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise log this crate at `level`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("webapp_deploy={level},warn")))
}
