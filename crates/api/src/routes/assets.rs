//! Per-asset price and volatility trend.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use cryptorisk_common::error::AppError;
use cryptorisk_engine::trend::{DEFAULT_TREND_WINDOW, TrendPoint, volatility_trend};
use cryptorisk_ingest::store::read_price_csv;

use crate::state::AppState;

const MIN_TREND_DAYS: usize = 7;
const MAX_TREND_DAYS: usize = 30;
const DEFAULT_TREND_DAYS: usize = 14;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/assets/{asset}/trend", get(get_trend))
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub days: Option<usize>,
    pub window: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub asset: String,
    pub days: usize,
    pub window: usize,
    pub points: Vec<TrendPoint>,
}

/// Coin ids are lowercase ASCII letters, digits and dashes.
fn is_valid_asset_id(asset: &str) -> bool {
    !asset.is_empty()
        && asset
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// GET /api/assets/:asset/trend?days=14&window=3 — Recent daily prices with
/// trailing rolling volatility.
async fn get_trend(
    State(state): State<AppState>,
    Path(asset): Path<String>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendResponse>, AppError> {
    let asset = asset.to_lowercase();
    if !is_valid_asset_id(&asset) {
        return Err(AppError::Validation(format!("Invalid asset id: {}", asset)));
    }

    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);
    if !(MIN_TREND_DAYS..=MAX_TREND_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between {} and {}",
            MIN_TREND_DAYS, MAX_TREND_DAYS
        )));
    }
    let window = params.window.unwrap_or(DEFAULT_TREND_WINDOW);

    let path = state.config.price_file(&asset);
    if !path.is_file() {
        return Err(AppError::NotFound(format!(
            "No stored price history for {}",
            asset
        )));
    }

    let series = {
        let asset = asset.clone();
        tokio::task::spawn_blocking(move || read_price_csv(&path, &asset))
            .await
            .map_err(|e| AppError::Internal(format!("price reader panicked: {}", e)))??
    };

    let points = volatility_trend(&series.tail(days), window)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(TrendResponse {
        asset,
        days,
        window,
        points,
    }))
}
