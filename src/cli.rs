//! Command-line Surface
//!
//! clap-derived commands shared by the binary. Every command except
//! `format-table` writes JSON to stdout; `auth-test` also prints a
//! per-platform status block first.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde_json::{Value, json};

use crate::domain::{AuthStatus, Platform, PlatformFilters, SearchOptions, SortBy};
use crate::usecases::Aggregator;
use crate::usecases::formatter::render_result;

/// Search prediction and betting-exchange markets from one place.
#[derive(Debug, Parser)]
#[command(name = "prediction-aggregator", version, about)]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(long, short, global = true, default_value = "config.toml")]
  pub config: String,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// List available commands and their parameters as JSON.
  ListTools,
  /// Search all enabled platforms and print the merged result as JSON.
  Search(SearchArgs),
  /// Search all enabled platforms and print a markdown table.
  FormatTable(SearchArgs),
  /// Fetch one market by id from one platform.
  Market {
    /// Platform-scoped market id (event slug or exchange market id).
    id: String,
    /// Platform that owns the id.
    #[arg(long)]
    platform: Platform,
  },
  /// Check credentials for every platform.
  AuthTest,
}

/// Arguments shared by `search` and `format-table`.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
  /// Free-text query.
  pub query: String,
  /// Only query this platform.
  #[arg(long)]
  pub platform: Option<Platform>,
  /// Drop markets below this USD volume.
  #[arg(long, value_parser = parse_min_volume)]
  pub min_volume: Option<f64>,
  /// Cap on merged results.
  #[arg(long, value_parser = parse_max_results)]
  pub max_results: Option<usize>,
  /// Sort key: volume, odds or platform.
  #[arg(long, default_value = "volume")]
  pub sort_by: SortBy,
  /// Exchange event-type id filter (repeatable).
  #[arg(long = "event-type")]
  pub event_types: Vec<String>,
}

impl SearchArgs {
  pub fn options(&self) -> SearchOptions {
    SearchOptions {
      platform: self.platform,
      min_volume: self.min_volume,
      max_results: self.max_results,
      sort_by: self.sort_by,
      filters: PlatformFilters { event_type_ids: self.event_types.clone() },
    }
  }
}

fn parse_min_volume(raw: &str) -> Result<f64, String> {
  match raw.trim().parse::<f64>() {
    Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
    Ok(_) => Err("must be a non-negative number".to_string()),
    Err(e) => Err(e.to_string()),
  }
}

fn parse_max_results(raw: &str) -> Result<usize, String> {
  match raw.trim().parse::<usize>() {
    Ok(0) => Err("must be at least 1".to_string()),
    Ok(v) => Ok(v),
    Err(e) => Err(e.to_string()),
  }
}

/// JSON catalogue of commands, derived from the clap definitions.
pub fn tool_catalogue() -> Value {
  let root = Cli::command();
  let tools: Vec<Value> = root
    .get_subcommands()
    .map(|cmd| {
      let parameters: Vec<Value> = cmd
        .get_arguments()
        .filter(|arg| !arg.is_global_set())
        .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version" | "config"))
        .map(|arg| {
          json!({
            "name": arg.get_long().map_or_else(|| arg.get_id().to_string(), str::to_string),
            "description": arg.get_help().map(ToString::to_string).unwrap_or_default(),
            "required": arg.is_required_set(),
          })
        })
        .collect();
      json!({
        "name": cmd.get_name(),
        "description": cmd.get_about().map(ToString::to_string).unwrap_or_default(),
        "parameters": parameters,
      })
    })
    .collect();

  json!({ "tools": tools })
}

/// Human-readable credential report printed ahead of the JSON.
pub fn auth_report(statuses: &BTreeMap<Platform, AuthStatus>) -> String {
  let mut out = String::from("Platform authentication:\n");
  for (platform, status) in statuses {
    let state = match (status.enabled, status.authenticated) {
      (false, _) => "disabled",
      (true, true) => "ok",
      (true, false) => "failed",
    };
    let _ = write!(out, "  {:<12} {state}", platform.as_str());
    if let Some(reason) = &status.error {
      let _ = write!(out, " ({reason})");
    }
    out.push('\n');
  }
  out
}

/// Run a data command and return everything destined for stdout.
pub async fn execute(command: &Command, aggregator: &Aggregator) -> Result<String> {
  match command {
    Command::ListTools => to_json(&tool_catalogue()),
    Command::Search(args) => {
      let result = aggregator.search_all(&args.query, &args.options()).await;
      to_json(&result)
    }
    Command::FormatTable(args) => {
      let result = aggregator.search_all(&args.query, &args.options()).await;
      Ok(render_result(&result))
    }
    Command::Market { id, platform } => {
      let market = aggregator
        .get_market(id, *platform)
        .await
        .with_context(|| format!("{platform} lookup failed for {id}"))?;
      to_json(&market)
    }
    Command::AuthTest => {
      let statuses = aggregator.test_auth().await;
      Ok(format!("{}\n{}", auth_report(&statuses), to_json(&statuses)?))
    }
  }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
  serde_json::to_string_pretty(value).context("Failed to serialize output")
}
