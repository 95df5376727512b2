//! Integration Tests - Aggregator Fan-out and Degradation
//!
//! Drives the Aggregator through mocked platform clients.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mockall::mock;
use mockall::predicate::*;

use prediction_aggregator::domain::{
    AuthStatus, MarketStatus, Platform, PlatformStatus, SearchOptions, SortBy, UnifiedMarket,
};
use prediction_aggregator::ports::{ClientError, ClientResult, MarketClient};
use prediction_aggregator::usecases::Aggregator;

// ---- Mock Definitions ----

mock! {
    pub Client {}

    #[async_trait::async_trait]
    impl MarketClient for Client {
        fn platform(&self) -> Platform;
        fn is_enabled(&self) -> bool;
        async fn search(
            &self,
            query: &str,
            options: &SearchOptions,
        ) -> ClientResult<Vec<UnifiedMarket>>;
        async fn get_market(&self, id: &str) -> ClientResult<Option<UnifiedMarket>>;
        async fn test_auth(&self) -> AuthStatus;
        async fn last_error(&self) -> Option<String>;
    }
}

// ---- Helpers ----

fn market(platform: Platform, id: &str, odds: f64, volume: f64) -> UnifiedMarket {
    UnifiedMarket {
        platform,
        id: id.to_string(),
        event_id: None,
        url: format!("https://example.test/{id}"),
        question: format!("Question {id}?"),
        outcomes: None,
        odds,
        volume,
        liquidity: None,
        status: MarketStatus::Open,
        end_date: None,
        last_updated: Utc::now(),
    }
}

fn client(platform: Platform, enabled: bool) -> MockClient {
    let mut mock = MockClient::new();
    mock.expect_platform().return_const(platform);
    mock.expect_is_enabled().return_const(enabled);
    mock
}

fn shared(client: MockClient) -> Arc<dyn MarketClient> {
    Arc::new(client)
}

fn three_polymarket_markets() -> Vec<UnifiedMarket> {
    vec![
        market(Platform::Polymarket, "a", 30.0, 5_000.0),
        market(Platform::Polymarket, "b", 70.0, 250_000.0),
        market(Platform::Polymarket, "c", 50.0, 12_000.0),
    ]
}

fn failing_betfair() -> MockClient {
    let mut betfair = client(Platform::Betfair, true);
    betfair
        .expect_search()
        .times(1)
        .returning(|_, _| Err(ClientError::Auth("INVALID_USERNAME_OR_PASSWORD".to_string())));
    betfair
}

/// Client that answers after a fixed delay, for exercising the fan-out.
struct DelayedClient {
    platform: Platform,
    delay: Duration,
    fail: bool,
}

#[async_trait::async_trait]
impl MarketClient for DelayedClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn search(
        &self,
        _query: &str,
        _options: &SearchOptions,
    ) -> ClientResult<Vec<UnifiedMarket>> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ClientError::Api { status: 503, message: "Service Unavailable".to_string() });
        }
        Ok(three_polymarket_markets())
    }

    async fn get_market(&self, _id: &str) -> ClientResult<Option<UnifiedMarket>> {
        Ok(None)
    }

    async fn test_auth(&self) -> AuthStatus {
        AuthStatus::ok()
    }

    async fn last_error(&self) -> Option<String> {
        None
    }
}

// ---- Integration Tests ----

#[tokio::test(start_paused = true)]
async fn test_platform_searches_run_concurrently() {
    let delay = Duration::from_millis(300);
    let clients: Vec<Arc<dyn MarketClient>> = vec![
        Arc::new(DelayedClient { platform: Platform::Betfair, delay, fail: true }),
        Arc::new(DelayedClient { platform: Platform::Polymarket, delay, fail: false }),
    ];
    let aggregator = Aggregator::new(clients);

    let started = tokio::time::Instant::now();
    let result = aggregator.search_all("q", &SearchOptions::default()).await;
    let elapsed = started.elapsed();

    // Sequential calls would take the sum of both delays.
    assert!(elapsed >= delay);
    assert!(elapsed < delay * 2, "searches ran sequentially: {elapsed:?}");

    assert!(matches!(
        result.meta.platforms[&Platform::Betfair],
        PlatformStatus::Error { .. }
    ));
    assert_eq!(
        result.meta.platforms[&Platform::Polymarket],
        PlatformStatus::Success { count: 3 }
    );
    assert_eq!(result.markets.len(), 3);
    assert_eq!(result.meta.warnings, vec!["betfair: API error 503: Service Unavailable"]);
}

#[tokio::test]
async fn test_one_platform_failing_does_not_void_the_other() {
    let mut polymarket = client(Platform::Polymarket, true);
    polymarket
        .expect_search()
        .with(eq("election"), always())
        .times(1)
        .returning(|_, _| Ok(three_polymarket_markets()));

    let aggregator = Aggregator::new(vec![shared(failing_betfair()), shared(polymarket)]);
    let result = aggregator.search_all("election", &SearchOptions::default()).await;

    assert_eq!(result.markets.len(), 3);
    assert_eq!(result.meta.total_results, 3);
    assert_eq!(result.meta.query, "election");
    assert_eq!(
        result.meta.platforms[&Platform::Polymarket],
        PlatformStatus::Success { count: 3 }
    );
    assert!(matches!(
        result.meta.platforms[&Platform::Betfair],
        PlatformStatus::Error { .. }
    ));
    assert_eq!(result.meta.warnings.len(), 1);
    assert!(result.meta.warnings[0].starts_with("betfair: "));
    assert!(result.meta.warnings[0].contains("INVALID_USERNAME_OR_PASSWORD"));

    // Default sort is volume descending.
    let ids: Vec<&str> = result.markets.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_error_status_serializes_with_message() {
    let mut polymarket = client(Platform::Polymarket, true);
    polymarket.expect_search().returning(|_, _| Ok(Vec::new()));

    let aggregator = Aggregator::new(vec![shared(failing_betfair()), shared(polymarket)]);
    let result = aggregator.search_all("q", &SearchOptions::default()).await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["meta"]["platforms"]["betfair"]["status"], "error");
    assert_eq!(json["meta"]["platforms"]["polymarket"]["status"], "success");
    assert_eq!(json["meta"]["platforms"]["polymarket"]["count"], 0);
    assert_eq!(json["meta"]["totalResults"], 0);
}

#[tokio::test]
async fn test_disabled_clients_are_never_queried() {
    let mut betfair = client(Platform::Betfair, false);
    betfair.expect_search().never();

    let mut polymarket = client(Platform::Polymarket, true);
    polymarket
        .expect_search()
        .times(1)
        .returning(|_, _| Ok(three_polymarket_markets()));

    let aggregator = Aggregator::new(vec![shared(betfair), shared(polymarket)]);
    let result = aggregator.search_all("q", &SearchOptions::default()).await;

    assert_eq!(result.meta.platforms[&Platform::Betfair], PlatformStatus::Disabled);
    assert!(result.meta.warnings.is_empty());
    assert_eq!(result.markets.len(), 3);
}

#[tokio::test]
async fn test_platform_filter_leaves_others_disabled() {
    let mut betfair = client(Platform::Betfair, true);
    betfair
        .expect_search()
        .times(1)
        .returning(|_, _| Ok(vec![market(Platform::Betfair, "1.1", 40.0, 900.0)]));

    let mut polymarket = client(Platform::Polymarket, true);
    polymarket.expect_search().never();

    let aggregator = Aggregator::new(vec![shared(betfair), shared(polymarket)]);
    let options = SearchOptions { platform: Some(Platform::Betfair), ..SearchOptions::default() };
    let result = aggregator.search_all("q", &options).await;

    assert_eq!(result.meta.platforms[&Platform::Betfair], PlatformStatus::Success { count: 1 });
    assert_eq!(result.meta.platforms[&Platform::Polymarket], PlatformStatus::Disabled);
}

#[tokio::test]
async fn test_filter_sort_and_limit_are_applied_after_merge() {
    let mut betfair = client(Platform::Betfair, true);
    betfair.expect_search().returning(|_, _| {
        Ok(vec![
            market(Platform::Betfair, "1.1", 90.0, 1_000.0),
            market(Platform::Betfair, "1.2", 10.0, 99.0),
        ])
    });
    let mut polymarket = client(Platform::Polymarket, true);
    polymarket.expect_search().returning(|_, _| Ok(three_polymarket_markets()));

    let aggregator = Aggregator::new(vec![shared(betfair), shared(polymarket)]);
    let options = SearchOptions {
        min_volume: Some(1_000.0),
        max_results: Some(3),
        sort_by: SortBy::Odds,
        ..SearchOptions::default()
    };
    let result = aggregator.search_all("q", &options).await;

    let ids: Vec<&str> = result.markets.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["1.1", "b", "c"]);
    assert_eq!(result.meta.total_results, 3);
    assert_eq!(result.meta.platforms[&Platform::Betfair], PlatformStatus::Success { count: 2 });
}

#[tokio::test]
async fn test_default_cap_applies_only_without_explicit_cap() {
    let mut polymarket = client(Platform::Polymarket, true);
    polymarket.expect_search().returning(|_, _| Ok(three_polymarket_markets()));

    let aggregator =
        Aggregator::new(vec![shared(polymarket)]).with_default_max_results(Some(2));

    let capped = aggregator.search_all("q", &SearchOptions::default()).await;
    assert_eq!(capped.markets.len(), 2);

    let explicit = SearchOptions { max_results: Some(10), ..SearchOptions::default() };
    let uncapped = aggregator.search_all("q", &explicit).await;
    assert_eq!(uncapped.markets.len(), 3);
}

#[tokio::test]
async fn test_get_market_dispatches_by_platform() {
    let mut betfair = client(Platform::Betfair, true);
    betfair
        .expect_get_market()
        .with(eq("1.999"))
        .times(1)
        .returning(|_| Ok(None));
    betfair
        .expect_get_market()
        .with(eq("1.234"))
        .times(1)
        .returning(|id| Ok(Some(market(Platform::Betfair, id, 55.0, 10.0))));

    let mut polymarket = client(Platform::Polymarket, true);
    polymarket.expect_get_market().never();

    let aggregator = Aggregator::new(vec![shared(betfair), shared(polymarket)]);

    let found = aggregator.get_market("1.234", Platform::Betfair).await.unwrap();
    assert_eq!(found.unwrap().id, "1.234");

    let missing = aggregator.get_market("1.999", Platform::Betfair).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_get_market_propagates_client_failure() {
    let mut betfair = client(Platform::Betfair, true);
    betfair.expect_get_market().returning(|_| {
        Err(ClientError::Api { status: 400, message: "TOO_MUCH_DATA".to_string() })
    });

    let aggregator = Aggregator::new(vec![shared(betfair)]);
    let err = aggregator.get_market("1.1", Platform::Betfair).await.unwrap_err();
    assert_eq!(err.kind(), "api");

    let absent = aggregator.get_market("anything", Platform::Polymarket).await.unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn test_auth_reports_every_platform() {
    let mut betfair = client(Platform::Betfair, true);
    betfair
        .expect_test_auth()
        .returning(|| AuthStatus::failed("INVALID_APP_KEY"));
    let mut polymarket = client(Platform::Polymarket, true);
    polymarket.expect_test_auth().returning(AuthStatus::ok);

    let aggregator = Aggregator::new(vec![shared(betfair), shared(polymarket)]);
    let statuses = aggregator.test_auth().await;

    assert_eq!(statuses.len(), 2);
    assert!(statuses[&Platform::Betfair].enabled);
    assert!(!statuses[&Platform::Betfair].authenticated);
    assert_eq!(statuses[&Platform::Betfair].error.as_deref(), Some("INVALID_APP_KEY"));
    assert_eq!(statuses[&Platform::Polymarket], AuthStatus::ok());
}
