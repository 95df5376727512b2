//! Market Client Port - Per-platform Search Interface
//!
//! One implementation per platform. Implementations do I/O and hand raw
//! records to their normalizer; they never merge across platforms.

use async_trait::async_trait;

use super::error::ClientResult;
use crate::domain::{AuthStatus, Platform, SearchOptions, UnifiedMarket};

/// Capability every platform client provides to the aggregator.
///
/// The aggregator holds clients as `Arc<dyn MarketClient>` and routes by
/// [`MarketClient::platform`].
#[async_trait]
pub trait MarketClient: Send + Sync + 'static {
  /// Platform tag this client serves.
  fn platform(&self) -> Platform;

  /// False when credentials are missing or the platform is switched off.
  /// Disabled clients are never queried.
  fn is_enabled(&self) -> bool;

  /// Search for markets matching `query`.
  ///
  /// Zero matches is `Ok(vec![])`, not an error.
  async fn search(
    &self,
    query: &str,
    options: &SearchOptions,
  ) -> ClientResult<Vec<UnifiedMarket>>;

  /// Look up a single market. Unknown ids yield `Ok(None)`.
  async fn get_market(&self, id: &str) -> ClientResult<Option<UnifiedMarket>>;

  /// Check that credentials work end to end.
  async fn test_auth(&self) -> AuthStatus;

  /// Most recent failure message, for diagnostics.
  async fn last_error(&self) -> Option<String>;
}
