//! Risk report routes.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use cryptorisk_common::error::AppError;
use cryptorisk_engine::summary::RiskSummary;
use cryptorisk_engine::trend::{RiskReturnPoint, risk_return};
use cryptorisk_engine::{RiskReport, RiskScoreEntry};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/risk", get(get_report))
        .route("/api/risk/summary", get(get_summary))
        .route("/api/risk/export.csv", get(export_csv))
        .route("/api/risk/{asset}", get(get_entry))
        .route("/api/risk-return", get(get_risk_return))
}

/// GET /api/risk — Full classified report, including skipped assets and cut points.
async fn get_report(State(state): State<AppState>) -> Result<Json<RiskReport>, AppError> {
    Ok(Json(state.report().await?))
}

/// GET /api/risk/summary — Totals, average score and assets per tier.
async fn get_summary(State(state): State<AppState>) -> Result<Json<RiskSummary>, AppError> {
    let report = state.report().await?;
    Ok(Json(RiskSummary::from_entries(&report.entries)))
}

/// GET /api/risk/export.csv — Flat risk table as a CSV download.
async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let csv = state.report().await?.to_csv_string()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"final_risk_analysis.csv\"",
            ),
        ],
        csv,
    ))
}

/// GET /api/risk/:asset — One asset's row of the current report.
async fn get_entry(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> Result<Json<RiskScoreEntry>, AppError> {
    let report = state.report().await?;
    report
        .entry(&asset)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Asset {} is not in the risk report", asset)))
}

/// GET /api/risk-return — Mean daily return against volatility for each stored asset.
///
/// Assets with fewer than two daily returns are left out.
async fn get_risk_return(
    State(state): State<AppState>,
) -> Result<Json<Vec<RiskReturnPoint>>, AppError> {
    let loaded = state.load_prices().await?;
    let points = loaded
        .series
        .iter()
        .filter_map(|series| match risk_return(series) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::debug!(asset = series.asset(), error = %e, "Omitting from risk-return");
                None
            }
        })
        .collect();
    Ok(Json(points))
}
