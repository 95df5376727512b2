//! Filtering and ordering of merged market lists.
//!
//! Sorting is stable: markets with equal keys keep their merge order,
//! which makes `sort_markets` idempotent.

use super::market::UnifiedMarket;
use super::search::SortBy;

/// Keep markets whose volume is at least `min_volume` (inclusive).
pub fn filter_by_min_volume(markets: Vec<UnifiedMarket>, min_volume: f64) -> Vec<UnifiedMarket> {
    markets
        .into_iter()
        .filter(|m| m.volume >= min_volume)
        .collect()
}

/// Sort in place: volume and odds descending, platform name ascending.
pub fn sort_markets(markets: &mut [UnifiedMarket], sort_by: SortBy) {
    match sort_by {
        SortBy::Volume => markets.sort_by(|a, b| b.volume.total_cmp(&a.volume)),
        SortBy::Odds => markets.sort_by(|a, b| b.odds.total_cmp(&a.odds)),
        SortBy::Platform => markets.sort_by(|a, b| a.platform.as_str().cmp(b.platform.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{MarketStatus, Platform};
    use chrono::Utc;

    fn market(platform: Platform, id: &str, volume: f64, odds: f64) -> UnifiedMarket {
        UnifiedMarket {
            platform,
            id: id.to_string(),
            event_id: None,
            url: String::new(),
            question: id.to_string(),
            outcomes: None,
            odds,
            volume,
            liquidity: None,
            status: MarketStatus::Open,
            end_date: None,
            last_updated: Utc::now(),
        }
    }

    fn ids(markets: &[UnifiedMarket]) -> Vec<&str> {
        markets.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_min_volume_is_inclusive() {
        let markets = vec![
            market(Platform::Betfair, "a", 99.99, 10.0),
            market(Platform::Betfair, "b", 100.0, 10.0),
            market(Platform::Polymarket, "c", 5000.0, 10.0),
        ];
        let kept = filter_by_min_volume(markets, 100.0);
        assert_eq!(ids(&kept), vec!["b", "c"]);
    }

    #[test]
    fn test_min_volume_zero_is_identity() {
        let markets = vec![
            market(Platform::Betfair, "a", 0.0, 10.0),
            market(Platform::Polymarket, "b", 12.0, 10.0),
        ];
        let kept = filter_by_min_volume(markets.clone(), 0.0);
        assert_eq!(kept, markets);
    }

    #[test]
    fn test_sort_by_volume_descending() {
        let mut markets = vec![
            market(Platform::Betfair, "low", 10.0, 90.0),
            market(Platform::Polymarket, "high", 1000.0, 5.0),
            market(Platform::Betfair, "mid", 100.0, 50.0),
        ];
        sort_markets(&mut markets, SortBy::Volume);
        assert_eq!(ids(&markets), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_sort_by_odds_descending() {
        let mut markets = vec![
            market(Platform::Betfair, "low", 10.0, 5.0),
            market(Platform::Polymarket, "high", 1000.0, 90.0),
        ];
        sort_markets(&mut markets, SortBy::Odds);
        assert_eq!(ids(&markets), vec!["high", "low"]);
    }

    #[test]
    fn test_sort_by_platform_ascending_keeps_tie_order() {
        let mut markets = vec![
            market(Platform::Polymarket, "p1", 1.0, 1.0),
            market(Platform::Betfair, "b1", 2.0, 1.0),
            market(Platform::Polymarket, "p2", 3.0, 1.0),
            market(Platform::Betfair, "b2", 4.0, 1.0),
        ];
        sort_markets(&mut markets, SortBy::Platform);
        assert_eq!(ids(&markets), vec!["b1", "b2", "p1", "p2"]);
    }
}
