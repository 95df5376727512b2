//! Polymarket page payload types.
//!
//! Records are pulled out of the page's embedded JSON, whose field types are
//! not consistent: numbers arrive as strings, ids as numbers, and outcome
//! lists either as arrays or as JSON-encoded strings. Every field is
//! optional and decoded leniently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An event: one page on the site, holding one or more markets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liquidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub closed: Option<bool>,
    #[serde(default)]
    pub markets: Vec<PolyMarket>,
}

/// A single tradable question inside an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyMarket {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    /// Short label inside a grouped event, e.g. a candidate name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub group_item_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub outcomes: Option<EncodedList>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub outcome_prices: Option<EncodedList>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liquidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub closed: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uma_resolution_status: Option<String>,
}

/// A list that arrives either natively or as a JSON-encoded string.
///
/// `["Yes","No"]` and `"[\"Yes\",\"No\"]"` decode identically.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EncodedList {
    Items(Vec<Value>),
    Encoded(String),
}

impl EncodedList {
    fn items(&self) -> Option<Vec<Value>> {
        match self {
            Self::Items(items) => Some(items.clone()),
            Self::Encoded(raw) => serde_json::from_str(raw).ok(),
        }
    }

    /// Decode as labels. `None` if any element is not a string or number.
    pub fn strings(&self) -> Option<Vec<String>> {
        self.items()?
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Decode as numbers. `None` if any element is not numeric.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        self.items()?
            .into_iter()
            .map(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect()
    }
}

/// Parse RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
pub fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Option<EncodedList>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
