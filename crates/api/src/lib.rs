//! Read-only HTTP API over the risk engine.
//!
//! Endpoints:
//! - GET /health
//! - GET /api/risk — full report
//! - GET /api/risk/summary — totals and tier breakdown
//! - GET /api/risk/export.csv — flat risk table
//! - GET /api/risk/{asset} — one asset's row
//! - GET /api/risk-return — mean daily return vs volatility per asset
//! - GET /api/assets/{asset}/trend — daily price and rolling volatility

pub mod routes;
pub mod state;
