//! Prediction Aggregator — Entry Point
//!
//! Parses the command line, loads configuration, initializes logging and
//! runs one command against the platform aggregator.
//!
//! Wiring sequence:
//! 1. Parse CLI, load `.env` secrets
//! 2. Answer `list-tools` without touching configuration
//! 3. Load config.toml + env overrides + validate
//! 4. Init tracing (JSON structured logging on stderr)
//! 5. Build platform clients and the Aggregator
//! 6. Execute the command, write its output to stdout
//!
//! Failures print `{"error": "..."}` to stdout and exit with status 1.

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{error, info};

use prediction_aggregator::cli::{self, Cli, Command};
use prediction_aggregator::config;
use prediction_aggregator::usecases::Aggregator;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match run(cli).await {
        Ok(output) => {
            if output.ends_with('\n') {
                print!("{output}");
            } else {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            println!("{}", json!({ "error": format!("{e:#}") }));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    // ── 1. Static catalogue needs no configuration ──────────
    if matches!(cli.command, Command::ListTools) {
        return serde_json::to_string_pretty(&cli::tool_catalogue())
            .context("Failed to serialize tool catalogue");
    }

    // ── 2. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&cli.config)
        .context("Failed to load configuration")?;

    // ── 3. Initialize structured JSON logging on stderr ─────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.global.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command,
        "Starting prediction aggregator"
    );

    // ── 4. Build platform clients ───────────────────────────
    let aggregator =
        Aggregator::from_config(&config).context("Failed to create platform clients")?;

    // ── 5. Run the command ──────────────────────────────────
    cli::execute(&cli.command, &aggregator).await
}
