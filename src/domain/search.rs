//! Search request and aggregated response types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::market::{Platform, UnifiedMarket};

/// Sort key for the merged market list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Descending by USD volume.
    #[default]
    Volume,
    /// Descending by headline probability.
    Odds,
    /// Ascending by platform name.
    Platform,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "volume" => Ok(Self::Volume),
            "odds" => Ok(Self::Odds),
            "platform" => Ok(Self::Platform),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Platform-specific hints. Platforms that do not understand a hint ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFilters {
    /// Exchange event-type (category) ids, e.g. `"1"` for soccer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_type_ids: Vec<String>,
}

/// Options accepted by every search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Restrict the search to a single platform.
    pub platform: Option<Platform>,
    /// Keep markets with `volume >= min_volume` (USD).
    pub min_volume: Option<f64>,
    /// Cap on the number of merged results.
    pub max_results: Option<usize>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub filters: PlatformFilters,
}

/// Outcome of one platform's part in an aggregated search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlatformStatus {
    Success { count: usize },
    Error { error: String },
    Disabled,
}

/// Metadata describing how an aggregated result was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMeta {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub platforms: BTreeMap<Platform, PlatformStatus>,
    pub total_results: usize,
    /// One `"<platform>: <message>"` entry per failed platform.
    pub warnings: Vec<String>,
}

/// Merged, filtered, sorted and truncated search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub markets: Vec<UnifiedMarket>,
    pub meta: ResultMeta,
}

impl AggregatedResult {
    /// Platforms that answered successfully, in name order.
    pub fn successful_platforms(&self) -> Vec<(Platform, usize)> {
        self.meta
            .platforms
            .iter()
            .filter_map(|(platform, status)| match status {
                PlatformStatus::Success { count } => Some((*platform, *count)),
                _ => None,
            })
            .collect()
    }
}

/// Per-platform credential diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub enabled: bool,
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthStatus {
    pub const fn ok() -> Self {
        Self { enabled: true, authenticated: true, error: None }
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        Self { enabled: false, authenticated: false, error: Some(reason.into()) }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { enabled: true, authenticated: false, error: Some(reason.into()) }
    }
}
