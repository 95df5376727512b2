//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, overlaying secrets from the environment,
//! validating all parameters, and providing clear error messages for
//! misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;

  info!(
    polymarket = config.polymarket.enabled,
    betfair = config.betfair.enabled && config.betfair.has_credentials(),
    currency_rate = config.global.currency_rate,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse a TOML document without validation.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Failed to parse config.toml")
}

/// Overlay exchange credentials from environment variables.
///
/// Recognised: `BETFAIR_APP_KEY`, `BETFAIR_USERNAME`, `BETFAIR_PASSWORD`,
/// `BETFAIR_CERT_PATH`, `BETFAIR_KEY_PATH`. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
  let betfair = &mut config.betfair;

  if let Some(v) = get("BETFAIR_APP_KEY") {
    betfair.app_key = v;
  }
  if let Some(v) = get("BETFAIR_USERNAME") {
    betfair.username = v;
  }
  if let Some(v) = get("BETFAIR_PASSWORD") {
    betfair.password = v;
  }
  if let Some(v) = get("BETFAIR_CERT_PATH") {
    betfair.cert_path = Some(v);
  }
  if let Some(v) = get("BETFAIR_KEY_PATH") {
    betfair.key_path = Some(v);
  }
}

/// Validate all configuration parameters.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.global.currency_rate.is_finite() && config.global.currency_rate > 0.0,
    "global.currency_rate must be positive, got {}",
    config.global.currency_rate
  );
  if let Some(max) = config.global.default_max_results {
    anyhow::ensure!(max > 0, "global.default_max_results must be positive");
  }

  if config.polymarket.enabled {
    anyhow::ensure!(
      !config.polymarket.base_url.is_empty(),
      "polymarket.base_url must not be empty"
    );
  }

  let betfair = &config.betfair;
  if betfair.enabled {
    anyhow::ensure!(!betfair.base_url.is_empty(), "betfair.base_url must not be empty");
    anyhow::ensure!(!betfair.sso_url.is_empty(), "betfair.sso_url must not be empty");
  }
  anyhow::ensure!(
    betfair.min_offer_size >= 0.0,
    "betfair.min_offer_size must be non-negative, got {}",
    betfair.min_offer_size
  );
  anyhow::ensure!(
    (0.0..=100.0).contains(&betfair.min_lay_percentage),
    "betfair.min_lay_percentage must be in [0, 100], got {}",
    betfair.min_lay_percentage
  );
  anyhow::ensure!(
    betfair.session_ttl_minutes > 0,
    "betfair.session_ttl_minutes must be positive"
  );
  anyhow::ensure!(
    betfair.cert_path.is_some() == betfair.key_path.is_some(),
    "betfair.cert_path and betfair.key_path must be set together"
  );

  Ok(())
}
