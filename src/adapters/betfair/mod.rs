//! Betfair Exchange Adapter
//!
//! Implements [`MarketClient`] over the exchange betting API: catalogue
//! search, live book pricing in request-weight-sized chunks, and
//! normalization into the unified schema.
//!
//! Sub-modules:
//! - `api`: HTTP client with SSO login and required headers
//! - `normalize`: back/lay book to implied probability conversion
//! - `session`: single-flight session token renewal
//! - `types`: API request/response type definitions

pub mod api;
pub mod normalize;
pub mod session;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::try_join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use self::api::{BetfairApi, BetfairApiConfig};
use self::normalize::{BookParams, normalize_market};
use self::types::{
  EventTypeResult, ListMarketBookRequest, ListMarketCatalogueRequest, MarketBook, MarketFilter,
  PriceProjection,
};
use crate::config::BetfairConfig;
use crate::domain::{AuthStatus, Platform, SearchOptions, UnifiedMarket};
use crate::ports::{ClientError, ClientResult, MarketClient};

/// Market ids per `listMarketBook` call (best-offers weight limit).
const BOOK_CHUNK_SIZE: usize = 40;
/// Catalogue size when the caller gives no cap.
const DEFAULT_CATALOGUE_RESULTS: usize = 50;
/// Exchange ceiling for one catalogue call.
const MAX_CATALOGUE_RESULTS: usize = 200;

const CATALOGUE_PROJECTION: [&str; 4] =
  ["EVENT", "EVENT_TYPE", "RUNNER_DESCRIPTION", "MARKET_START_TIME"];

/// Exchange market client.
pub struct BetfairClient {
  api: BetfairApi,
  params: BookParams,
  enabled: bool,
  disabled_reason: &'static str,
  last_error: RwLock<Option<String>>,
}

impl BetfairClient {
  /// Build the client from its config section and the global currency rate.
  pub fn new(config: &BetfairConfig, currency_rate: f64) -> ClientResult<Self> {
    let (enabled, disabled_reason) = match (config.enabled, config.has_credentials()) {
      (false, _) => (false, "disabled in configuration"),
      (true, false) => (false, "missing credentials (app_key, username, password)"),
      (true, true) => (true, ""),
    };
    if !enabled {
      info!(reason = disabled_reason, "Betfair client disabled");
    }

    Ok(Self {
      api: BetfairApi::new(BetfairApiConfig::from(config))?,
      params: BookParams {
        min_offer_size: config.min_offer_size,
        min_lay_percentage: config.min_lay_percentage,
        currency_rate,
      },
      enabled,
      disabled_reason,
      last_error: RwLock::new(None),
    })
  }

  /// Event types (categories) with their market counts.
  pub async fn list_event_types(&self) -> ClientResult<Vec<EventTypeResult>> {
    self.ensure_enabled()?;
    let result = self.api.list_event_types().await;
    self.record(&result).await;
    result
  }

  fn ensure_enabled(&self) -> ClientResult<()> {
    if self.enabled {
      Ok(())
    } else {
      Err(ClientError::Disabled(Platform::Betfair))
    }
  }

  async fn record<T>(&self, result: &ClientResult<T>) {
    if let Err(e) = result {
      *self.last_error.write().await = Some(e.to_string());
    }
  }

  async fn catalogue_search(
    &self,
    filter: MarketFilter,
    max_results: usize,
  ) -> ClientResult<Vec<UnifiedMarket>> {
    let request = ListMarketCatalogueRequest {
      filter,
      market_projection: CATALOGUE_PROJECTION.to_vec(),
      sort: "MAXIMUM_TRADED",
      max_results: max_results.clamp(1, MAX_CATALOGUE_RESULTS),
    };
    let catalogues = self.api.list_market_catalogue(&request).await?;
    if catalogues.is_empty() {
      return Ok(Vec::new());
    }

    let ids: Vec<String> = catalogues.iter().map(|c| c.market_id.clone()).collect();
    let books = self.fetch_books(&ids).await?;
    let fetched_at = Utc::now();

    debug!(
      catalogues = catalogues.len(),
      books = books.len(),
      "Exchange catalogue priced"
    );

    Ok(
      catalogues
        .iter()
        .map(|c| normalize_market(c, books.get(&c.market_id), &self.params, fetched_at))
        .collect(),
    )
  }

  /// Fetch books for `ids` in concurrent chunks, keyed by market id.
  async fn fetch_books(&self, ids: &[String]) -> ClientResult<HashMap<String, MarketBook>> {
    let requests: Vec<ListMarketBookRequest> = ids
      .chunks(BOOK_CHUNK_SIZE)
      .map(|chunk| ListMarketBookRequest {
        market_ids: chunk.to_vec(),
        price_projection: PriceProjection { price_data: vec!["EX_BEST_OFFERS"] },
      })
      .collect();

    let pages = try_join_all(requests.iter().map(|r| self.api.list_market_book(r))).await?;

    Ok(
      pages
        .into_iter()
        .flatten()
        .map(|book| (book.market_id.clone(), book))
        .collect(),
    )
  }
}

#[async_trait]
impl MarketClient for BetfairClient {
  fn platform(&self) -> Platform {
    Platform::Betfair
  }

  fn is_enabled(&self) -> bool {
    self.enabled
  }

  async fn search(
    &self,
    query: &str,
    options: &SearchOptions,
  ) -> ClientResult<Vec<UnifiedMarket>> {
    self.ensure_enabled()?;

    let query = query.trim();
    let filter = MarketFilter {
      text_query: (!query.is_empty()).then(|| query.to_string()),
      event_type_ids: options.filters.event_type_ids.clone(),
      ..MarketFilter::default()
    };
    let max_results = options.max_results.unwrap_or(DEFAULT_CATALOGUE_RESULTS);

    let result = self.catalogue_search(filter, max_results).await;
    self.record(&result).await;
    result
  }

  async fn get_market(&self, id: &str) -> ClientResult<Option<UnifiedMarket>> {
    self.ensure_enabled()?;

    let filter = MarketFilter {
      market_ids: vec![id.to_string()],
      ..MarketFilter::default()
    };
    let result = self.catalogue_search(filter, 1).await;
    self.record(&result).await;
    Ok(result?.into_iter().next())
  }

  async fn test_auth(&self) -> AuthStatus {
    if !self.enabled {
      return AuthStatus::disabled(self.disabled_reason);
    }

    if let Err(e) = self.api.session_token().await {
      warn!(error = %e, "Exchange login failed");
      *self.last_error.write().await = Some(e.to_string());
      return AuthStatus::failed(e.to_string());
    }

    match self.list_event_types().await {
      Ok(types) => {
        info!(event_types = types.len(), "Exchange credentials verified");
        AuthStatus::ok()
      }
      Err(e) => {
        warn!(error = %e, "Exchange probe failed");
        AuthStatus::failed(e.to_string())
      }
    }
  }

  async fn last_error(&self) -> Option<String> {
    self.last_error.read().await.clone()
  }
}
