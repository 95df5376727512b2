//! Aggregator - Parallel Multi-platform Search
//!
//! Fans one query out to every enabled platform client, waits for all of
//! them to settle, and merges whatever succeeded into one ranked list.
//! A failing platform never voids the others: its error lands in the
//! result metadata as a per-platform status plus a warning line.
//!
//! Search flow:
//! 1. Select enabled clients matching the optional platform filter
//! 2. Spawn one search task per client
//! 3. Join all tasks (no early return on first result or first error)
//! 4. Record per-platform status, merge markets
//! 5. Min-volume filter, sort, truncate

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::adapters::betfair::BetfairClient;
use crate::adapters::polymarket::PolymarketClient;
use crate::config::AppConfig;
use crate::domain::ranking::{filter_by_min_volume, sort_markets};
use crate::domain::{
  AggregatedResult, AuthStatus, Platform, PlatformStatus, ResultMeta, SearchOptions,
  UnifiedMarket,
};
use crate::ports::{ClientResult, MarketClient};

/// Orchestrates searches across the registered platform clients.
pub struct Aggregator {
  /// One client per platform.
  clients: Vec<Arc<dyn MarketClient>>,
  /// Result cap used when a search gives none.
  default_max_results: Option<usize>,
}

impl Aggregator {
  /// Create an aggregator over an explicit client set.
  pub fn new(clients: Vec<Arc<dyn MarketClient>>) -> Self {
    Self { clients, default_max_results: None }
  }

  /// Set the cap applied when [`SearchOptions::max_results`] is absent.
  #[must_use]
  pub fn with_default_max_results(mut self, cap: Option<usize>) -> Self {
    self.default_max_results = cap;
    self
  }

  /// Build both platform clients from loaded configuration.
  pub fn from_config(config: &AppConfig) -> ClientResult<Self> {
    let clients: Vec<Arc<dyn MarketClient>> = vec![
      Arc::new(BetfairClient::new(&config.betfair, config.global.currency_rate)?),
      Arc::new(PolymarketClient::new(&config.polymarket)?),
    ];
    Ok(Self::new(clients).with_default_max_results(config.global.default_max_results))
  }

  /// The registered client for `platform`, if any.
  pub fn client(&self, platform: Platform) -> Option<&Arc<dyn MarketClient>> {
    self.clients.iter().find(|c| c.platform() == platform)
  }

  /// Search every enabled platform in parallel and merge the results.
  ///
  /// Never fails: per-platform failures are reported in `meta.platforms`
  /// and `meta.warnings`.
  #[instrument(skip(self, options), fields(platform = ?options.platform))]
  pub async fn search_all(&self, query: &str, options: &SearchOptions) -> AggregatedResult {
    let mut options = options.clone();
    options.max_results = options.max_results.or(self.default_max_results);

    let mut platforms: BTreeMap<Platform, PlatformStatus> = self
      .clients
      .iter()
      .map(|c| (c.platform(), PlatformStatus::Disabled))
      .collect();

    let candidates: Vec<&Arc<dyn MarketClient>> = self
      .clients
      .iter()
      .filter(|c| c.is_enabled())
      .filter(|c| options.platform.is_none_or(|p| p == c.platform()))
      .collect();

    debug!(candidates = candidates.len(), "Dispatching platform searches");

    let tasks = candidates.into_iter().map(|client| {
      let client = Arc::clone(client);
      let platform = client.platform();
      let query = query.to_string();
      let options = options.clone();
      let handle = tokio::spawn(async move { client.search(&query, &options).await });
      async move {
        let outcome = match handle.await {
          Ok(result) => result.map_err(|e| e.to_string()),
          Err(e) => Err(format!("search task failed: {e}")),
        };
        (platform, outcome)
      }
    });

    let settled = join_all(tasks).await;

    let mut markets: Vec<UnifiedMarket> = Vec::new();
    let mut warnings = Vec::new();
    for (platform, outcome) in settled {
      match outcome {
        Ok(found) => {
          debug!(%platform, count = found.len(), "Platform search succeeded");
          platforms.insert(platform, PlatformStatus::Success { count: found.len() });
          markets.extend(found);
        }
        Err(message) => {
          warn!(%platform, error = %message, "Platform search failed");
          warnings.push(format!("{platform}: {message}"));
          platforms.insert(platform, PlatformStatus::Error { error: message });
        }
      }
    }

    if let Some(min_volume) = options.min_volume {
      markets = filter_by_min_volume(markets, min_volume);
    }
    sort_markets(&mut markets, options.sort_by);
    if let Some(cap) = options.max_results {
      markets.truncate(cap);
    }

    info!(
      results = markets.len(),
      warnings = warnings.len(),
      "Aggregated search complete"
    );

    AggregatedResult {
      meta: ResultMeta {
        query: query.to_string(),
        timestamp: Utc::now(),
        platforms,
        total_results: markets.len(),
        warnings,
      },
      markets,
    }
  }

  /// Look up one market on one platform.
  ///
  /// `Ok(None)` for a platform with no registered client or an unknown id.
  /// Client failures propagate.
  pub async fn get_market(
    &self,
    id: &str,
    platform: Platform,
  ) -> ClientResult<Option<UnifiedMarket>> {
    match self.client(platform) {
      Some(client) => client.get_market(id).await,
      None => Ok(None),
    }
  }

  /// Credential diagnostics for every registered platform.
  pub async fn test_auth(&self) -> BTreeMap<Platform, AuthStatus> {
    let checks = self.clients.iter().map(|client| async move {
      (client.platform(), client.test_auth().await)
    });
    join_all(checks).await.into_iter().collect()
  }
}
