//! Market client error taxonomy.
//!
//! Malformed individual records never surface here; normalizers recover them
//! with defaults. `Malformed` is reserved for a whole response that cannot be
//! interpreted at all.

use thiserror::Error;

use crate::domain::Platform;

/// Result type alias for market client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failures raised by a market client.
#[derive(Debug, Error)]
pub enum ClientError {
  /// Credentials are missing or the platform is switched off in config.
  #[error("{0} is disabled")]
  Disabled(Platform),

  /// Login or session refresh rejected.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// Non-success response from the platform.
  #[error("API error {status}: {message}")]
  Api { status: u16, message: String },

  /// Network-level failure.
  #[error("HTTP request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// Response shape could not be interpreted.
  #[error("unexpected payload: {0}")]
  Malformed(String),
}

impl ClientError {
  /// Stable category name for diagnostics.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::Disabled(_) => "disabled",
      Self::Auth(_) => "auth",
      Self::Api { .. } => "api",
      Self::Transport(_) => "transport",
      Self::Malformed(_) => "malformed",
    }
  }
}

impl From<serde_json::Error> for ClientError {
  fn from(err: serde_json::Error) -> Self {
    Self::Malformed(err.to_string())
  }
}
