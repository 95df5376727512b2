//! Polymarket Adapter - Public Page Scraper
//!
//! Implements [`MarketClient`] without credentials: fetches the site's
//! search and event pages, pulls the embedded JSON payload out of the HTML,
//! walks it for result records and normalizes each one.
//!
//! Sub-modules:
//! - `payload`: embedded payload extraction and tolerant record walk
//! - `normalize`: outcome/price decoding into the unified schema
//! - `types`: lenient payload record types

pub mod normalize;
pub mod payload;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, info};

use self::normalize::normalize_record;
use self::payload::{collect_records, extract_next_data, find_by_slug};
use crate::config::PolymarketConfig;
use crate::domain::{AuthStatus, Platform, SearchOptions, UnifiedMarket};
use crate::ports::{ClientError, ClientResult, MarketClient};

const BROWSER_AGENT: &str =
  "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Public share-price market client.
pub struct PolymarketClient {
  /// Underlying HTTP client.
  http: Client,
  /// Site root without trailing slash.
  base_url: String,
  enabled: bool,
  last_error: RwLock<Option<String>>,
}

impl PolymarketClient {
  /// Build the client from its config section. No network traffic happens here.
  pub fn new(config: &PolymarketConfig) -> ClientResult<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_seconds))
      .pool_max_idle_per_host(5)
      .build()?;

    if !config.enabled {
      info!("Polymarket client disabled");
    }

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      enabled: config.enabled,
      last_error: RwLock::new(None),
    })
  }

  /// Fetch a page's HTML. `Ok(None)` on 404.
  async fn fetch_page(&self, url: &str, query: &[(&str, &str)]) -> ClientResult<Option<String>> {
    let response = self
      .http
      .get(url)
      .query(query)
      .header(USER_AGENT, BROWSER_AGENT)
      .header(ACCEPT, "text/html,application/xhtml+xml")
      .send()
      .await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      debug!(url, "Page not found");
      return Ok(None);
    }
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ClientError::Api {
        status: status.as_u16(),
        message: body.trim().chars().take(200).collect(),
      });
    }

    Ok(Some(response.text().await?))
  }

  async fn scrape_search(&self, query: &str) -> ClientResult<Vec<UnifiedMarket>> {
    let url = format!("{}/search", self.base_url);
    let Some(html) = self.fetch_page(&url, &[("_q", query)]).await? else {
      return Ok(Vec::new());
    };

    let root = extract_next_data(&html)?;
    let records = collect_records(&root);
    let fetched_at = Utc::now();

    let markets: Vec<UnifiedMarket> = records
      .into_iter()
      .filter_map(|r| normalize_record(r, &self.base_url, fetched_at))
      .collect();

    debug!(query, markets = markets.len(), "Polymarket search scraped");
    Ok(markets)
  }

  async fn scrape_event(&self, slug: &str) -> ClientResult<Option<UnifiedMarket>> {
    let url = format!("{}/event/{slug}", self.base_url);
    let Some(html) = self.fetch_page(&url, &[]).await? else {
      return Ok(None);
    };

    let root = extract_next_data(&html)?;
    Ok(
      find_by_slug(&root, slug)
        .and_then(|record| normalize_record(record, &self.base_url, Utc::now())),
    )
  }

  async fn record<T>(&self, result: &ClientResult<T>) {
    if let Err(e) = result {
      *self.last_error.write().await = Some(e.to_string());
    }
  }
}

#[async_trait]
impl MarketClient for PolymarketClient {
  fn platform(&self) -> Platform {
    Platform::Polymarket
  }

  fn is_enabled(&self) -> bool {
    self.enabled
  }

  async fn search(
    &self,
    query: &str,
    _options: &SearchOptions,
  ) -> ClientResult<Vec<UnifiedMarket>> {
    if !self.enabled {
      return Err(ClientError::Disabled(Platform::Polymarket));
    }
    let result = self.scrape_search(query.trim()).await;
    self.record(&result).await;
    result
  }

  async fn get_market(&self, id: &str) -> ClientResult<Option<UnifiedMarket>> {
    if !self.enabled {
      return Err(ClientError::Disabled(Platform::Polymarket));
    }
    let result = self.scrape_event(id.trim()).await;
    self.record(&result).await;
    result
  }

  async fn test_auth(&self) -> AuthStatus {
    if self.enabled {
      AuthStatus::ok()
    } else {
      AuthStatus::disabled("disabled in configuration")
    }
  }

  async fn last_error(&self) -> Option<String> {
    self.last_error.read().await.clone()
  }
}
