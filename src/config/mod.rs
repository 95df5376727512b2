//! Configuration Module - TOML-based Aggregator Configuration
//!
//! Loads and validates configuration from `config.toml`, with secret
//! overrides from environment variables. The loaded [`AppConfig`] is passed
//! into clients and the aggregator; nothing below this module reads files.

pub mod loader;

use serde::Deserialize;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Settings shared by every platform.
  #[serde(default)]
  pub global: GlobalConfig,
  /// Public share-price platform.
  #[serde(default)]
  pub polymarket: PolymarketConfig,
  /// Cert/session-authenticated exchange.
  #[serde(default)]
  pub betfair: BetfairConfig,
}

/// Global settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
  /// Exchange native currency to USD rate.
  #[serde(default = "default_currency_rate")]
  pub currency_rate: f64,
  /// Result cap applied when a search does not give one.
  #[serde(default = "default_max_results")]
  pub default_max_results: Option<usize>,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for GlobalConfig {
  fn default() -> Self {
    Self {
      currency_rate: default_currency_rate(),
      default_max_results: default_max_results(),
      log_level: default_log_level(),
    }
  }
}

/// Polymarket settings. No credentials are needed.
#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Site root serving `/search` and `/event/{slug}` pages.
  #[serde(default = "default_polymarket_url")]
  pub base_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

impl Default for PolymarketConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      base_url: default_polymarket_url(),
      timeout_seconds: default_timeout(),
    }
  }
}

/// Betfair Exchange settings.
///
/// The client is enabled only when `enabled` is set and the application
/// key, username and password are all non-empty.
#[derive(Debug, Clone, Deserialize)]
pub struct BetfairConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Betting REST root, e.g. `.../exchange/betting/rest/v1.0`.
  #[serde(default = "default_betfair_url")]
  pub base_url: String,
  /// Interactive login endpoint root.
  #[serde(default = "default_sso_url")]
  pub sso_url: String,
  /// Certificate login endpoint root.
  #[serde(default = "default_cert_sso_url")]
  pub cert_sso_url: String,
  #[serde(default)]
  pub app_key: String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  /// PEM client certificate. Certificate login is used when both paths are set.
  #[serde(default)]
  pub cert_path: Option<String>,
  /// PEM private key matching `cert_path`.
  #[serde(default)]
  pub key_path: Option<String>,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Quotes backed by less than this (native currency) are ignored.
  #[serde(default = "default_min_offer_size")]
  pub min_offer_size: f64,
  /// Lay quotes implying less than this percentage are ignored.
  #[serde(default = "default_min_lay_percentage")]
  pub min_lay_percentage: f64,
  /// Session token validity window.
  #[serde(default = "default_session_ttl")]
  pub session_ttl_minutes: u64,
}

impl BetfairConfig {
  /// True when all credentials needed to log in are present.
  pub fn has_credentials(&self) -> bool {
    !self.app_key.is_empty() && !self.username.is_empty() && !self.password.is_empty()
  }

  /// Both certificate paths, when certificate login is configured.
  pub fn cert_identity_paths(&self) -> Option<(&str, &str)> {
    match (self.cert_path.as_deref(), self.key_path.as_deref()) {
      (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => Some((cert, key)),
      _ => None,
    }
  }
}

impl Default for BetfairConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      base_url: default_betfair_url(),
      sso_url: default_sso_url(),
      cert_sso_url: default_cert_sso_url(),
      app_key: String::new(),
      username: String::new(),
      password: String::new(),
      cert_path: None,
      key_path: None,
      timeout_seconds: default_timeout(),
      min_offer_size: default_min_offer_size(),
      min_lay_percentage: default_min_lay_percentage(),
      session_ttl_minutes: default_session_ttl(),
    }
  }
}

// Default value functions for serde

fn default_currency_rate() -> f64 {
  1.27
}

#[allow(clippy::unnecessary_wraps)]
fn default_max_results() -> Option<usize> {
  Some(20)
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_timeout() -> u64 {
  15
}

fn default_polymarket_url() -> String {
  "https://polymarket.com".to_string()
}

fn default_betfair_url() -> String {
  "https://api.betfair.com/exchange/betting/rest/v1.0".to_string()
}

fn default_sso_url() -> String {
  "https://identitysso.betfair.com".to_string()
}

fn default_cert_sso_url() -> String {
  "https://identitysso-cert.betfair.com".to_string()
}

fn default_min_offer_size() -> f64 {
  10.0
}

fn default_min_lay_percentage() -> f64 {
  1.0
}

fn default_session_ttl() -> u64 {
  15
}
