//! Exchange book normalizer.
//!
//! Turns a market catalogue plus its live book into a [`UnifiedMarket`].
//! Each runner's ladders are read best-first; a level only counts when it is
//! backed by at least `min_offer_size`, and a lay level must additionally
//! imply at least `min_lay_percentage`. Surviving prices become implied
//! probabilities, and two-sided runners are priced at the midpoint.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::types::{ExchangePrices, MarketBook, MarketCatalogue, PriceSize, RunnerBook};
use crate::domain::odds::{convert_currency, decimal_odds_to_implied_probability, midpoint, spread};
use crate::domain::{MarketStatus, Outcome, Platform, UnifiedMarket};

/// Public market page root; the market id is appended.
pub const MARKET_URL_BASE: &str = "https://www.betfair.com/exchange/plus/market/";

/// Thresholds and conversion applied to every book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookParams {
    /// Minimum native-currency size for a quote to count.
    pub min_offer_size: f64,
    /// Lay quotes implying less than this percentage are noise.
    pub min_lay_percentage: f64,
    /// Native currency to USD.
    pub currency_rate: f64,
}

impl Default for BookParams {
    fn default() -> Self {
        Self {
            min_offer_size: 10.0,
            min_lay_percentage: 1.0,
            currency_rate: 1.27,
        }
    }
}

/// Price one runner from its exchange ladders.
///
/// Each side is priced from its first level that clears the size (and, for
/// lays, the probability) floor, so a deeper level can price the runner
/// when the top of book is undersized.
pub fn normalize_runner(name: &str, ex: Option<&ExchangePrices>, params: &BookParams) -> Outcome {
    let backs: &[PriceSize] = ex.map_or(&[][..], |ex| ex.available_to_back.as_slice());
    let lays: &[PriceSize] = ex.map_or(&[][..], |ex| ex.available_to_lay.as_slice());

    let best_back = backs.iter().find(|level| level.size >= params.min_offer_size);
    let best_lay = lays.iter().find(|level| {
        level.size >= params.min_offer_size
            && decimal_odds_to_implied_probability(level.price) >= params.min_lay_percentage
    });

    // Only an under-sized back with no lay side at all counts as thin.
    let thin_liquidity =
        backs.first().is_some_and(|level| level.size < params.min_offer_size) && lays.is_empty();

    let back_odds = best_back.map(|level| decimal_odds_to_implied_probability(level.price));
    let lay_odds = best_lay.map(|level| decimal_odds_to_implied_probability(level.price));

    let (odds, spread_value, back_only) = match (back_odds, lay_odds) {
        (Some(back), Some(lay)) => (midpoint(back, lay), Some(spread(back, lay)), false),
        (Some(_), None) => (0.0, None, true),
        _ => (0.0, None, false),
    };

    Outcome {
        name: name.to_string(),
        odds,
        back_odds,
        lay_odds,
        spread: spread_value,
        back_size: best_back.map(|level| convert_currency(level.size, params.currency_rate)),
        lay_size: best_lay.map(|level| convert_currency(level.size, params.currency_rate)),
        thin_liquidity,
        back_only,
    }
}

/// Build a unified market from its catalogue entry and (optional) live book.
pub fn normalize_market(
    catalogue: &MarketCatalogue,
    book: Option<&MarketBook>,
    params: &BookParams,
    fetched_at: DateTime<Utc>,
) -> UnifiedMarket {
    let book_runners: HashMap<u64, &RunnerBook> = book
        .map(|b| b.runners.iter().map(|r| (r.selection_id, r)).collect())
        .unwrap_or_default();

    let mut runners: Vec<_> = catalogue.runners.iter().collect();
    runners.sort_by_key(|r| r.sort_priority.unwrap_or(u32::MAX));

    let mut outcomes: Vec<Outcome> = runners
        .into_iter()
        .filter_map(|runner| {
            let priced = book_runners.get(&runner.selection_id);
            if priced.and_then(|r| r.status.as_deref()) == Some("REMOVED") {
                return None;
            }
            let name = if runner.runner_name.is_empty() {
                runner.selection_id.to_string()
            } else {
                runner.runner_name.clone()
            };
            Some(normalize_runner(&name, priced.and_then(|r| r.ex.as_ref()), params))
        })
        .collect();

    // Stable: back-only runners (odds 0) keep catalogue order at the bottom.
    outcomes.sort_by(|a, b| b.odds.total_cmp(&a.odds));
    let odds = outcomes.first().map_or(0.0, |o| o.odds);

    let matched = book
        .and_then(|b| b.total_matched)
        .or(catalogue.total_matched)
        .unwrap_or(0.0);

    let question = match &catalogue.event {
        Some(event) if !event.name.is_empty() => {
            format!("{} - {}", event.name, catalogue.market_name)
        }
        _ => catalogue.market_name.clone(),
    };

    UnifiedMarket {
        platform: Platform::Betfair,
        id: catalogue.market_id.clone(),
        event_id: catalogue.event.as_ref().map(|e| e.id.clone()),
        url: format!("{MARKET_URL_BASE}{}", catalogue.market_id),
        question,
        outcomes: (!outcomes.is_empty()).then_some(outcomes),
        odds,
        volume: convert_currency(matched, params.currency_rate),
        liquidity: book
            .and_then(|b| b.total_available)
            .map(|v| convert_currency(v, params.currency_rate)),
        status: book.map_or(MarketStatus::Unknown, |b| market_status(b.status.as_deref())),
        end_date: catalogue
            .market_start_time
            .or_else(|| catalogue.event.as_ref().and_then(|e| e.open_date)),
        last_updated: fetched_at,
    }
}

/// Map exchange book status onto the unified status.
pub fn market_status(status: Option<&str>) -> MarketStatus {
    match status {
        Some("OPEN") => MarketStatus::Open,
        Some("SUSPENDED" | "INACTIVE") => MarketStatus::Closed,
        Some("CLOSED") => MarketStatus::Settled,
        _ => MarketStatus::Unknown,
    }
}
