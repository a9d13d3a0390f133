//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to test Axum routes without a real HTTP server.
//! Each test writes its own price store into a temporary directory.

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, NaiveDate};
use tower::ServiceExt;

use cryptorisk_api::routes::create_router;
use cryptorisk_api::state::AppState;
use cryptorisk_common::config::AppConfig;
use cryptorisk_common::types::PriceSeries;
use cryptorisk_ingest::store::write_price_csv;

// ============================================================
// Helpers
// ============================================================

fn temp_data_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "cryptorisk-api-{}-{}",
        name,
        std::process::id()
    ));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_config(data_dir: PathBuf) -> AppConfig {
    AppConfig {
        report_path: data_dir.join("final_risk_analysis.csv"),
        data_dir,
        ..AppConfig::default()
    }
}

fn series(asset: &str, prices: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PriceSeries::from_pairs(
        asset,
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| (start + Duration::days(i as i64), *p)),
    )
    .unwrap()
}

/// Deterministic 30-day path: drift plus a repeating wiggle of `swing` percent.
fn synthetic(asset: &str, start_price: f64, swing: f64) -> PriceSeries {
    let wiggle = [0.0, 1.0, -0.5, 0.75, -1.0, 0.25, 0.5];
    let mut price = start_price;
    let mut prices = Vec::with_capacity(30);
    for i in 0..30 {
        prices.push(price);
        price *= 1.0 + swing / 100.0 * wiggle[i % wiggle.len()] + 0.001;
    }
    series(asset, &prices)
}

/// Five tracked coins plus one listed too recently to score.
fn seeded_config(name: &str) -> AppConfig {
    let config = test_config(temp_data_dir(name));
    let batch = [
        synthetic("bitcoin", 42000.0, 1.0),
        synthetic("ethereum", 2300.0, 2.0),
        synthetic("solana", 95.0, 4.0),
        synthetic("cardano", 0.5, 3.0),
        synthetic("dogecoin", 0.08, 6.0),
        series("newcoin", &[1.0, 1.1]),
    ];
    for s in &batch {
        write_price_csv(&config.price_file(s.asset()), s).unwrap();
    }
    config
}

fn seeded_app(name: &str) -> axum::Router {
    create_router(AppState::new(seeded_config(name)).unwrap())
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::body::Bytes) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================
// Health
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(AppState::new(test_config(temp_data_dir("health"))).unwrap());
    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "cryptorisk-api");
    assert_eq!(json["assets"].as_array().unwrap().len(), 5);
}

// ============================================================
// Risk report
// ============================================================

#[tokio::test]
async fn test_full_report() {
    let (status, json) = get_json(seeded_app("report"), "/api/risk").await;
    assert_eq!(status, StatusCode::OK);

    let entries = json["entries"].as_array().unwrap();
    let rows: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| {
            (
                e["asset"].as_str().unwrap(),
                e["risk_tier"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("bitcoin", "Stable"),
            ("cardano", "Alert"),
            ("dogecoin", "Extreme"),
            ("ethereum", "Stable"),
            ("solana", "Extreme"),
        ]
    );

    let skipped = json["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["asset"], "newcoin");

    let low = json["thresholds"]["low"].as_f64().unwrap();
    let high = json["thresholds"]["high"].as_f64().unwrap();
    assert!(low <= high);
}

#[tokio::test]
async fn test_files_for_other_horizons_are_ignored() {
    let config = seeded_config("stale");
    // Left behind by an earlier run with HISTORY_DAYS=90
    let stale = config.data_dir.join("bitcoin_price_90_days.csv");
    write_price_csv(&stale, &synthetic("bitcoin", 30000.0, 9.0)).unwrap();

    let app = create_router(AppState::new(config).unwrap());
    let (status, json) = get_json(app, "/api/risk").await;
    assert_eq!(status, StatusCode::OK);

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["asset"], "bitcoin");
    assert_eq!(entries[0]["risk_tier"], "Stable");
}

#[tokio::test]
async fn test_single_entry_lookup() {
    let (status, json) = get_json(seeded_app("entry"), "/api/risk/dogecoin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["asset"], "dogecoin");
    assert_eq!(json["risk_tier"], "Extreme");
    assert!(json["risk_score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_entry_lookup_ignores_case() {
    let (status, json) = get_json(seeded_app("entry-case"), "/api/risk/Bitcoin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["asset"], "bitcoin");
}

#[tokio::test]
async fn test_unknown_and_skipped_assets_are_not_found() {
    let (status, json) = get_json(seeded_app("entry-missing"), "/api/risk/polkadot").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("polkadot"));

    let (status, _) = get_json(seeded_app("entry-skipped"), "/api/risk/newcoin").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_summary() {
    let (status, json) = get_json(seeded_app("summary"), "/api/risk/summary").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["total_assets"], 5);
    assert_eq!(json["riskiest_asset"], "dogecoin");
    assert_eq!(json["calmest_asset"], "bitcoin");
    assert!(json["average_risk_score"].as_f64().unwrap() > 0.0);

    let tiers = json["tiers"].as_array().unwrap();
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[0]["tier"], "Extreme");
    assert_eq!(tiers[0]["count"], 2);
    assert_eq!(tiers[1]["tier"], "Alert");
    assert_eq!(tiers[1]["count"], 1);
    assert_eq!(tiers[2]["tier"], "Stable");
    assert_eq!(tiers[2]["count"], 2);
}

#[tokio::test]
async fn test_csv_export() {
    let response = seeded_app("export")
        .oneshot(
            Request::builder()
                .uri("/api/risk/export.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(disposition.contains("final_risk_analysis.csv"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Coin,Overall Volatility (%),Avg Rolling Volatility (%),Risk Score,Risk Level"
    );
    assert_eq!(lines.len(), 6);
    assert!(lines[1].starts_with("bitcoin,"));
    assert!(lines[1].ends_with(",Stable"));
}

#[tokio::test]
async fn test_empty_store_is_unprocessable() {
    let app = create_router(AppState::new(test_config(temp_data_dir("empty"))).unwrap());
    let (status, json) = get_json(app, "/api/risk").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].is_string());
}

// ============================================================
// Trend and risk-return
// ============================================================

#[tokio::test]
async fn test_trend_defaults() {
    let (status, json) = get_json(seeded_app("trend"), "/api/assets/bitcoin/trend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["asset"], "bitcoin");
    assert_eq!(json["days"], 14);
    assert_eq!(json["window"], 3);

    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 14);
    // Last 14 of 30 days
    assert_eq!(points[0]["date"], "2024-01-17");
    assert_eq!(points[13]["date"], "2024-01-30");
    assert!(points[0]["daily_return"].is_null());
    assert!(points[1]["daily_return"].is_number());
    assert!(points[2]["rolling_volatility"].is_null());
    assert!(points[3]["rolling_volatility"].is_number());
}

#[tokio::test]
async fn test_trend_custom_range() {
    let (status, json) = get_json(
        seeded_app("trend-custom"),
        "/api/assets/solana/trend?days=30&window=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 30);
    assert!(points[4]["rolling_volatility"].is_null());
    assert!(points[5]["rolling_volatility"].is_number());
}

#[tokio::test]
async fn test_trend_rejects_bad_parameters() {
    let (status, _) = get_json(seeded_app("trend-days-low"), "/api/assets/bitcoin/trend?days=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(seeded_app("trend-days-high"), "/api/assets/bitcoin/trend?days=31").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(seeded_app("trend-window"), "/api/assets/bitcoin/trend?window=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(seeded_app("trend-id"), "/api/assets/bit.coin/trend").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trend_unknown_asset() {
    let (status, json) = get_json(seeded_app("trend-missing"), "/api/assets/polkadot/trend").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("polkadot"));
}

#[tokio::test]
async fn test_risk_return() {
    let (status, json) = get_json(seeded_app("risk-return"), "/api/risk-return").await;
    assert_eq!(status, StatusCode::OK);

    let points = json.as_array().unwrap();
    let assets: Vec<&str> = points.iter().map(|p| p["asset"].as_str().unwrap()).collect();
    // newcoin has a single return and is left out
    assert_eq!(
        assets,
        vec!["bitcoin", "cardano", "dogecoin", "ethereum", "solana"]
    );
    for point in points {
        assert!(point["volatility"].as_f64().unwrap() > 0.0);
        assert!(point["average_return"].is_number());
    }
}
