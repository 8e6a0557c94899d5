//! Integration tests for the EODHD client against a mock server.

use chrono::NaiveDate;
use finsight_data::{DataError, EodhdClient, MemoryCache, ProviderConfig, ResponseCache};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        api_token: "test-token".to_string(),
        base_url: server.uri(),
        rate_limit_ms: 0,
        ..ProviderConfig::default()
    }
}

fn bars() -> serde_json::Value {
    json!([
        {"date": "2024-01-02", "open": 187.15, "high": 188.44, "low": 183.89,
         "close": 185.64, "adjusted_close": 184.73, "volume": 82488700},
        {"date": "2024-01-03", "open": 184.22, "high": 185.88, "low": 183.43,
         "close": 184.25, "adjusted_close": 183.35, "volume": 58414500}
    ])
}

#[tokio::test]
async fn test_second_identical_request_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/AAPL.US"))
        .and(query_param("api_token", "test-token"))
        .and(query_param("fmt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bars()))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = EodhdClient::new(&config(&server))
        .unwrap()
        .with_cache(cache.clone());

    let first = client.fetch_eod("AAPL.US", None, None).await.unwrap();
    let second = client.fetch_eod("AAPL.US", None, None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(cache.stats().active_entries, 1);
}

#[tokio::test]
async fn test_distinct_date_ranges_are_cached_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/div/KO.US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"date": "2023-03-14", "value": 0.46, "currency": "USD"}
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = EodhdClient::new(&config(&server))
        .unwrap()
        .with_cache(cache.clone());

    let from_a = NaiveDate::from_ymd_opt(2014, 1, 1);
    let from_b = NaiveDate::from_ymd_opt(2015, 1, 1);
    client.fetch_dividends("KO.US", from_a, None).await.unwrap();
    client.fetch_dividends("KO.US", from_b, None).await.unwrap();
    client.fetch_dividends("KO.US", from_a, None).await.unwrap();

    assert_eq!(cache.stats().active_entries, 2);
}

#[tokio::test]
async fn test_cache_key_omits_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fundamentals/MSFT.US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"General": {"Code": "MSFT"}})))
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = EodhdClient::new(&config(&server))
        .unwrap()
        .with_cache(cache.clone());

    let fundamentals = client.fetch_fundamentals("MSFT.US").await.unwrap();
    assert_eq!(fundamentals.raw()["General"]["Code"], "MSFT");

    assert!(cache.get("fundamentals/MSFT.US?fmt=json").unwrap().is_some());
}

#[tokio::test]
async fn test_error_status_is_reported_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/NOPE.US"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Ticker Not Found."))
        .expect(2)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = EodhdClient::new(&config(&server))
        .unwrap()
        .with_cache(cache.clone());

    for _ in 0..2 {
        let err = client.fetch_eod("NOPE.US", None, None).await.unwrap_err();
        match err {
            DataError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Ticker Not Found.");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }
    assert_eq!(cache.stats().total_entries, 0);
}

#[tokio::test]
async fn test_client_without_cache_always_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/apple"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Code": "AAPL", "Name": "Apple Inc", "Exchange": "US",
             "Country": "USA", "Type": "Common Stock"}
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let client = EodhdClient::new(&config(&server)).unwrap();
    let results = client.search("apple", 5).await.unwrap();
    client.search("apple", 5).await.unwrap();

    assert_eq!(results[0].code, "AAPL");
}

#[tokio::test]
async fn test_slow_provider_times_out_instead_of_hanging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/SLOW.US"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(bars())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let client = EodhdClient::new(&ProviderConfig {
        timeout_secs: 1,
        ..config(&server)
    })
    .unwrap()
    .with_cache(cache.clone());

    let started = Instant::now();
    let err = client.fetch_eod("SLOW.US", None, None).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(4));
    match err {
        DataError::Network(e) => assert!(e.is_timeout(), "expected a timeout, got {e}"),
        other => panic!("expected network timeout, got {other:?}"),
    }
    assert_eq!(cache.stats().total_entries, 0);
}
