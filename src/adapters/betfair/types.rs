//! Betfair Exchange API Request/Response Types
//!
//! Serialization types for the betting REST API and the SSO login
//! endpoints. Field names follow the exchange's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Requests ────────────────────────────────────────────────

/// Market filter shared by catalogue and event-type listings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFilter {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text_query: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub event_type_ids: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub market_ids: Vec<String>,
}

/// `listMarketCatalogue` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMarketCatalogueRequest {
  pub filter: MarketFilter,
  pub market_projection: Vec<&'static str>,
  pub sort: &'static str,
  pub max_results: usize,
}

/// `listMarketBook` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMarketBookRequest {
  pub market_ids: Vec<String>,
  pub price_projection: PriceProjection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceProjection {
  pub price_data: Vec<&'static str>,
}

/// `listEventTypes` request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListEventTypesRequest {
  pub filter: MarketFilter,
}

// ── Catalogue ───────────────────────────────────────────────

/// Static description of a market.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCatalogue {
  pub market_id: String,
  #[serde(default)]
  pub market_name: String,
  /// Matched amount in the exchange's native currency.
  #[serde(default)]
  pub total_matched: Option<f64>,
  #[serde(default)]
  pub market_start_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub event: Option<EventInfo>,
  #[serde(default)]
  pub runners: Vec<RunnerCatalog>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub open_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerCatalog {
  pub selection_id: u64,
  #[serde(default)]
  pub runner_name: String,
  #[serde(default)]
  pub sort_priority: Option<u32>,
}

// ── Book ────────────────────────────────────────────────────

/// Live prices for a market.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBook {
  pub market_id: String,
  /// `OPEN`, `SUSPENDED`, `INACTIVE` or `CLOSED`.
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub total_matched: Option<f64>,
  #[serde(default)]
  pub total_available: Option<f64>,
  #[serde(default)]
  pub runners: Vec<RunnerBook>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerBook {
  pub selection_id: u64,
  /// `ACTIVE`, `WINNER`, `LOSER`, `REMOVED`, ...
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub ex: Option<ExchangePrices>,
}

/// Best-first price ladders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePrices {
  #[serde(default)]
  pub available_to_back: Vec<PriceSize>,
  #[serde(default)]
  pub available_to_lay: Vec<PriceSize>,
}

/// One ladder level: decimal price and native-currency size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct PriceSize {
  pub price: f64,
  pub size: f64,
}

// ── Event types ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeResult {
  pub event_type: EventType,
  #[serde(default)]
  pub market_count: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventType {
  pub id: String,
  pub name: String,
}

// ── Auth / errors ───────────────────────────────────────────

/// Interactive login response (`/api/login`).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
  #[serde(default)]
  pub token: Option<String>,
  pub status: String,
  #[serde(default)]
  pub error: Option<String>,
}

/// Certificate login response (`/api/certlogin`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertLoginResponse {
  #[serde(default)]
  pub session_token: Option<String>,
  pub login_status: String,
}

/// Rejection body returned by the betting API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub faultstring: Option<String>,
  #[serde(default)]
  pub detail: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
  #[serde(rename = "APINGException", default)]
  pub aping_exception: Option<ApingException>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApingException {
  #[serde(default)]
  pub error_code: Option<String>,
  #[serde(default)]
  pub error_details: Option<String>,
}

impl ApiErrorBody {
  /// Exchange error code, e.g. `INVALID_APP_KEY`.
  pub fn error_code(&self) -> Option<&str> {
    self.detail
      .as_ref()
      .and_then(|d| d.aping_exception.as_ref())
      .and_then(|e| e.error_code.as_deref())
      .or(self.faultstring.as_deref())
  }
}
