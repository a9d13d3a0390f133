//! Integration tests for the fetch → store → analyze pipeline.
//!
//! A local axum server stands in for the CoinGecko API. The Redis cache test
//! needs a running Redis and is ignored by default:
//!
//! ```bash
//! REDIS_URL="redis://localhost:6379" \
//!   cargo test -p cryptorisk-ingest --test integration -- --ignored --nocapture
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use cryptorisk_engine::RiskTier;
use cryptorisk_engine::run_risk_analysis;
use cryptorisk_ingest::cache::PriceCache;
use cryptorisk_ingest::coingecko::{CoinGeckoClient, FetchError};
use cryptorisk_ingest::fetcher::PriceFetcher;
use cryptorisk_ingest::store::{load_price_dir, write_price_csv};

// ============================================================
// Mock CoinGecko server
// ============================================================

const JAN_1_2024_MS: i64 = 1_704_067_200_000;
const HOUR_MS: i64 = 3_600_000;

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<AtomicUsize>,
}

/// Four samples per day for `days` days, alternating by `swing` percent.
fn hourly_prices(base: f64, swing: f64, days: i64) -> Vec<(i64, f64)> {
    let mut out = Vec::new();
    for day in 0..days {
        let level = if day % 2 == 0 { base } else { base * (1.0 + swing / 100.0) };
        for slot in 0..4 {
            out.push((JAN_1_2024_MS + day * 24 * HOUR_MS + slot * 6 * HOUR_MS, level));
        }
    }
    out
}

async fn market_chart(
    State(state): State<MockState>,
    Path(coin): Path<String>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if params.get("vs_currency").map(String::as_str) != Some("usd") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let days: i64 = params
        .get("days")
        .and_then(|d| d.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let prices = match coin.as_str() {
        "bitcoin" => hourly_prices(42000.0, 1.0, days),
        "ethereum" => hourly_prices(2300.0, 3.0, days),
        "dogecoin" => hourly_prices(0.08, 9.0, days),
        "newcoin" => hourly_prices(1.0, 5.0, 2),
        "broken" => return Ok(Json(json!({ "status": "no prices here" }))),
        _ => return Err(StatusCode::NOT_FOUND),
    };

    Ok(Json(json!({ "prices": prices, "market_caps": [], "total_volumes": [] })))
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/v3/coins/{id}/market_chart", get(market_chart))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/v3", addr), state)
}

fn fetcher(base_url: &str) -> PriceFetcher {
    let client = CoinGeckoClient::new(base_url, Duration::from_secs(5)).unwrap();
    PriceFetcher::new(client, "usd", 30)
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "cryptorisk-ingest-{}-{}",
        name,
        std::process::id()
    ));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================
// Fetching
// ============================================================

#[tokio::test]
async fn test_fetch_series_aggregates_to_daily() {
    let (base_url, _) = spawn_mock().await;
    let series = fetcher(&base_url).fetch_series("bitcoin").await.unwrap();

    assert_eq!(series.asset(), "bitcoin");
    assert_eq!(series.len(), 30);
    let prices: Vec<f64> = series.prices().take(2).collect();
    assert_eq!(prices[0], 42000.0);
    assert!((prices[1] - 42420.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_unknown_coin_is_api_error() {
    let (base_url, _) = spawn_mock().await;
    let err = fetcher(&base_url).fetch_series("nosuchcoin").await.unwrap_err();
    assert!(matches!(err, FetchError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_missing_prices_is_parse_error() {
    let (base_url, _) = spawn_mock().await;
    let err = fetcher(&base_url).fetch_series("broken").await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_all_continues_past_failures() {
    let (base_url, state) = spawn_mock().await;
    let coins: Vec<String> = ["bitcoin", "nosuchcoin", "dogecoin"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let outcome = fetcher(&base_url).fetch_all(&coins).await;

    let fetched: Vec<&str> = outcome.series.iter().map(|s| s.asset()).collect();
    assert_eq!(fetched, vec!["bitcoin", "dogecoin"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].asset, "nosuchcoin");
    assert_eq!(state.hits.load(Ordering::SeqCst), 3);
}

// ============================================================
// Full pipeline
// ============================================================

#[tokio::test]
async fn test_fetch_store_analyze() {
    let (base_url, _) = spawn_mock().await;
    let dir = temp_dir("pipeline");
    let coins: Vec<String> = ["bitcoin", "ethereum", "dogecoin", "newcoin"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let outcome = fetcher(&base_url).fetch_all(&coins).await;
    assert!(outcome.failures.is_empty());
    for series in &outcome.series {
        let path = dir.join(format!("{}_price_30_days.csv", series.asset()));
        write_price_csv(&path, series).unwrap();
    }

    let loaded = load_price_dir(&dir, 30).unwrap();
    assert!(loaded.rejected.is_empty());
    assert_eq!(loaded.series.len(), 4);

    let report = run_risk_analysis(&loaded.series).unwrap();

    // newcoin has two days of history and is skipped
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].asset, "newcoin");

    // Files load in name order: bitcoin, dogecoin, ethereum
    let rows: Vec<(&str, RiskTier)> = report
        .entries
        .iter()
        .map(|e| (e.asset.as_str(), e.risk_tier))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("bitcoin", RiskTier::Stable),
            ("dogecoin", RiskTier::Extreme),
            ("ethereum", RiskTier::Alert),
        ]
    );

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================
// Redis fetch cache
// ============================================================

#[tokio::test]
#[ignore] // Requires REDIS_URL — run explicitly with --ignored
async fn test_cache_serves_second_fetch() {
    let redis_url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
    let (base_url, state) = spawn_mock().await;

    let cache = PriceCache::connect(&redis_url, 60).await.unwrap();
    let key = PriceCache::key("ethereum", "usd", 30);
    cache.invalidate(&key).await.unwrap();

    let fetcher = fetcher(&base_url).with_cache(cache.clone());
    let first = fetcher.fetch_series("ethereum").await.unwrap();
    let second = fetcher.fetch_series("ethereum").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(state.hits.load(Ordering::SeqCst), 1);

    cache.invalidate(&key).await.unwrap();
}
