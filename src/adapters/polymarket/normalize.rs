//! Polymarket record normalization.
//!
//! One [`UnifiedMarket`] per event. A single-market event exposes that
//! market's own outcome list (e.g. Yes/No); a grouped event exposes one
//! outcome per member market, labelled by its group title and priced at the
//! member's first outcome. Prices are probabilities in `[0, 1]`; amounts are
//! already USD so no currency conversion applies.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::types::{PolyEvent, PolyMarket, parse_end_date};
use crate::domain::odds::{probability_decimal_to_percent, round2};
use crate::domain::{MarketStatus, Outcome, Platform, UnifiedMarket};

/// Scalar odds when no outcome price can be decoded.
pub const DEFAULT_ODDS: f64 = 50.0;

/// Normalize one raw payload record: an event, or a bare market.
///
/// Records that cannot be decoded at all, or carry neither slug nor id,
/// yield `None` so the rest of the batch survives.
pub fn normalize_record(
    record: &Value,
    base_url: &str,
    fetched_at: DateTime<Utc>,
) -> Option<UnifiedMarket> {
    let event = if record.get("markets").is_some() {
        serde_json::from_value::<PolyEvent>(record.clone())
    } else {
        serde_json::from_value::<PolyMarket>(record.clone()).map(event_from_market)
    };

    match event {
        Ok(event) => normalize_event(&event, base_url, fetched_at),
        Err(e) => {
            debug!(error = %e, "Skipping undecodable Polymarket record");
            None
        }
    }
}

/// Wrap a bare market as a single-market event.
fn event_from_market(market: PolyMarket) -> PolyEvent {
    PolyEvent {
        id: market.id.clone(),
        slug: market.slug.clone(),
        title: market.question.clone(),
        volume: market.volume,
        liquidity: market.liquidity,
        end_date: market.end_date.clone(),
        active: market.active,
        closed: market.closed,
        markets: vec![market],
    }
}

pub fn normalize_event(
    event: &PolyEvent,
    base_url: &str,
    fetched_at: DateTime<Utc>,
) -> Option<UnifiedMarket> {
    let Some(slug) = event.slug.as_deref().or(event.id.as_deref()) else {
        debug!("Skipping Polymarket record without slug or id");
        return None;
    };

    let question = event
        .title
        .clone()
        .or_else(|| event.markets.first().and_then(|m| m.question.clone()))
        .unwrap_or_default();

    let outcomes = match event.markets.as_slice() {
        [single] => market_outcomes(single),
        members => group_outcomes(members),
    };
    if outcomes.is_empty() {
        debug!(slug, "No decodable outcome prices, defaulting odds");
    }
    let odds = outcomes.first().map_or(DEFAULT_ODDS, |o| o.odds);

    let volume = event
        .volume
        .or_else(|| sum_present(event.markets.iter().map(|m| m.volume)))
        .unwrap_or(0.0);
    let liquidity = event
        .liquidity
        .or_else(|| sum_present(event.markets.iter().map(|m| m.liquidity)));

    let end_date = event
        .end_date
        .as_deref()
        .or_else(|| event.markets.iter().find_map(|m| m.end_date.as_deref()))
        .and_then(parse_end_date);

    Some(UnifiedMarket {
        platform: Platform::Polymarket,
        id: slug.to_string(),
        event_id: event.id.clone(),
        url: format!("{}/event/{slug}", base_url.trim_end_matches('/')),
        question,
        outcomes: (!outcomes.is_empty()).then_some(outcomes),
        odds,
        volume: round2(volume),
        liquidity: liquidity.map(round2),
        status: event_status(event),
        end_date,
        last_updated: fetched_at,
    })
}

/// Outcomes of a standalone market, in listed order.
fn market_outcomes(market: &PolyMarket) -> Vec<Outcome> {
    let names = market.outcomes.as_ref().and_then(|l| l.strings());
    let prices = market.outcome_prices.as_ref().and_then(|l| l.numbers());

    match (names, prices) {
        (Some(names), Some(prices)) if names.len() == prices.len() => names
            .into_iter()
            .zip(prices)
            .map(|(name, p)| Outcome::simple(name, probability_decimal_to_percent(p)))
            .collect(),
        _ => Vec::new(),
    }
}

/// One outcome per member market, favourite first.
fn group_outcomes(markets: &[PolyMarket]) -> Vec<Outcome> {
    let mut outcomes: Vec<Outcome> = markets
        .iter()
        .filter_map(|m| {
            let name = m.group_item_title.clone().or_else(|| m.question.clone())?;
            let price = m.outcome_prices.as_ref()?.numbers()?.into_iter().next()?;
            Some(Outcome::simple(name, probability_decimal_to_percent(price)))
        })
        .collect();
    outcomes.sort_by(|a, b| b.odds.total_cmp(&a.odds));
    outcomes
}

fn sum_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

fn event_status(event: &PolyEvent) -> MarketStatus {
    let resolved = !event.markets.is_empty()
        && event.markets.iter().all(|m| {
            m.uma_resolution_status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("resolved"))
        });

    match (event.closed, event.active) {
        (Some(true), _) if resolved => MarketStatus::Settled,
        (Some(true), _) => MarketStatus::Closed,
        (_, Some(true)) => MarketStatus::Open,
        _ => MarketStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://polymarket.com";

    fn normalize(record: &Value) -> Option<UnifiedMarket> {
        normalize_record(record, BASE, Utc::now())
    }

    #[test]
    fn test_binary_event_keeps_listed_order() {
        let market = normalize(&json!({
            "id": "903",
            "slug": "fed-cut-december",
            "title": "Fed rate cut in December?",
            "volume": "1520000",
            "liquidity": 48000,
            "endDate": "2026-12-10T00:00:00Z",
            "active": true,
            "closed": false,
            "markets": [{
                "question": "Fed rate cut in December?",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.22\", \"0.78\"]"
            }]
        }))
        .unwrap();

        assert_eq!(market.platform, Platform::Polymarket);
        assert_eq!(market.id, "fed-cut-december");
        assert_eq!(market.event_id.as_deref(), Some("903"));
        assert_eq!(market.url, "https://polymarket.com/event/fed-cut-december");
        assert_eq!(market.odds, 22.0);
        assert_eq!(market.volume, 1_520_000.0);
        assert_eq!(market.liquidity, Some(48_000.0));
        assert_eq!(market.status, MarketStatus::Open);
        assert!(market.end_date.is_some());

        let outcomes = market.outcomes.unwrap();
        assert_eq!(outcomes[0].name, "Yes");
        assert_eq!(outcomes[0].odds, 22.0);
        assert_eq!(outcomes[1].odds, 78.0);
    }

    #[test]
    fn test_native_and_encoded_lists_normalize_identically() {
        let encoded = normalize(&json!({"slug": "a", "markets": [{
            "outcomes": "[\"Yes\",\"No\"]", "outcomePrices": "[\"0.6\",\"0.4\"]"
        }]}))
        .unwrap();
        let native = normalize(&json!({"slug": "a", "markets": [{
            "outcomes": ["Yes", "No"], "outcomePrices": [0.6, 0.4]
        }]}))
        .unwrap();

        assert_eq!(encoded.odds, native.odds);
        assert_eq!(encoded.outcomes, native.outcomes);
    }

    #[test]
    fn test_grouped_event_ranks_members() {
        let market = normalize(&json!({
            "slug": "next-pm",
            "title": "Next Prime Minister?",
            "markets": [
                {"groupItemTitle": "Candidate A", "outcomePrices": "[\"0.15\",\"0.85\"]", "volume": "1000"},
                {"groupItemTitle": "Candidate B", "outcomePrices": "[\"0.61\",\"0.39\"]", "volume": 2500.5},
                {"groupItemTitle": "Candidate C", "outcomePrices": "garbage"}
            ]
        }))
        .unwrap();

        let outcomes = market.outcomes.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "Candidate B");
        assert_eq!(market.odds, 61.0);
        assert_eq!(market.volume, 3500.5);
    }

    #[test]
    fn test_malformed_prices_default_to_even_odds() {
        let market = normalize(&json!({"slug": "broken", "title": "Q?", "markets": [{
            "outcomes": ["Yes", "No"], "outcomePrices": "[\"0.5\""
        }]}))
        .unwrap();
        assert_eq!(market.odds, DEFAULT_ODDS);
        assert!(market.outcomes.is_none());
        assert_eq!(market.volume, 0.0);

        let mismatched = normalize(&json!({"slug": "m", "markets": [{
            "outcomes": ["Yes", "No", "Maybe"], "outcomePrices": ["0.5", "0.5"]
        }]}))
        .unwrap();
        assert_eq!(mismatched.odds, DEFAULT_ODDS);
    }

    #[test]
    fn test_bare_market_record() {
        let market = normalize(&json!({
            "id": 77,
            "slug": "will-it-snow",
            "question": "Will it snow?",
            "outcomes": ["Yes", "No"],
            "outcomePrices": ["0.1", "0.9"],
            "closed": true,
            "umaResolutionStatus": "resolved"
        }))
        .unwrap();

        assert_eq!(market.question, "Will it snow?");
        assert_eq!(market.event_id.as_deref(), Some("77"));
        assert_eq!(market.odds, 10.0);
        assert_eq!(market.status, MarketStatus::Settled);
    }

    #[test]
    fn test_status_mapping() {
        let closed = normalize(&json!({"slug": "c", "closed": true, "markets": []})).unwrap();
        assert_eq!(closed.status, MarketStatus::Closed);

        let unknown = normalize(&json!({"slug": "u", "markets": []})).unwrap();
        assert_eq!(unknown.status, MarketStatus::Unknown);
    }

    #[test]
    fn test_mistyped_field_keeps_the_record() {
        let market = normalize(&json!({
            "slug": "rate-hike",
            "title": {"en": "Rate hike?"},
            "active": "true",
            "closed": "no",
            "markets": [{
                "question": "Rate hike?",
                "outcomes": ["Yes", "No"],
                "outcomePrices": ["0.3", "0.7"]
            }]
        }))
        .unwrap();

        assert_eq!(market.id, "rate-hike");
        assert_eq!(market.question, "Rate hike?");
        assert_eq!(market.status, MarketStatus::Open);
        assert_eq!(market.odds, 30.0);
    }

    #[test]
    fn test_record_without_identity_is_skipped() {
        assert!(normalize(&json!({"title": "Orphan", "markets": []})).is_none());
        assert!(normalize(&json!({"markets": "not a list"})).is_none());
    }
}
