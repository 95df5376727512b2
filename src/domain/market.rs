//! Unified market schema.
//!
//! Every platform adapter converts its native records into these types.
//! Probabilities are percentages in `0..=100`, money is always USD.
//! Values are built once by a normalizer and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Platform tag
// ────────────────────────────────────────────

/// Closed set of supported platforms.
///
/// The aggregator dispatches on this tag, never on the concrete client type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Betfair Exchange (two-sided back/lay book, session auth).
    Betfair,
    /// Polymarket (share-price markets, public pages).
    Polymarket,
}

impl Platform {
    /// Every platform, in lexicographic order of its name.
    pub const ALL: [Self; 2] = [Self::Betfair, Self::Polymarket];

    /// Lowercase tag used in output and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Betfair => "betfair",
            Self::Polymarket => "polymarket",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "betfair" => Ok(Self::Betfair),
            "polymarket" => Ok(Self::Polymarket),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Trading status of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Open,
    Closed,
    Settled,
    #[default]
    Unknown,
}

// ────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────

/// One possible result within a market.
///
/// When both `back_odds` and `lay_odds` are present, `odds` is their
/// midpoint and `spread` their absolute difference (both 2 d.p.).
/// A `back_only` outcome always has `odds == 0` and no `lay_odds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Display name of the outcome / runner.
    pub name: String,
    /// Implied probability (0–100).
    pub odds: f64,
    /// Implied probability of the best surviving back price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_odds: Option<f64>,
    /// Implied probability of the best surviving lay price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lay_odds: Option<f64>,
    /// `|back_odds - lay_odds|`; larger means less reliable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    /// USD available at the best back price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_size: Option<f64>,
    /// USD available at the best lay price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lay_size: Option<f64>,
    /// Best price is not backed by enough money to be trusted.
    #[serde(default)]
    pub thin_liquidity: bool,
    /// Only a back quote exists; `odds` is 0 and `back_odds` is indicative.
    #[serde(default)]
    pub back_only: bool,
}

impl Outcome {
    /// Outcome carrying a single probability and no book detail.
    pub fn simple(name: impl Into<String>, odds: f64) -> Self {
        Self {
            name: name.into(),
            odds,
            back_odds: None,
            lay_odds: None,
            spread: None,
            back_size: None,
            lay_size: None,
            thin_liquidity: false,
            back_only: false,
        }
    }
}

// ────────────────────────────────────────────
// UnifiedMarket
// ────────────────────────────────────────────

/// A market from any platform in the common schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMarket {
    pub platform: Platform,
    /// Opaque, platform-scoped identifier accepted by `get_market`.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub url: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<Outcome>>,
    /// Headline probability (favourite or first outcome, per platform).
    pub odds: f64,
    /// Matched volume in USD.
    pub volume: f64,
    /// Available liquidity in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    pub status: MarketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// When this record was fetched.
    pub last_updated: DateTime<Utc>,
}
