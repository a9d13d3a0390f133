//! Shared application state for the Axum API server.

use std::sync::Arc;

use cryptorisk_common::config::AppConfig;
use cryptorisk_common::error::AppError;
use cryptorisk_engine::{RiskAnalyzer, RiskReport};
use cryptorisk_ingest::store::{LoadedPrices, load_price_dir};

/// Application state shared across all route handlers via Axum `State`.
///
/// Holds no computed results: every request scores the price store afresh.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analyzer: RiskAnalyzer,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let analyzer = RiskAnalyzer::new(&config.risk)?;
        Ok(Self {
            config: Arc::new(config),
            analyzer,
        })
    }

    /// Read every stored price file off the async runtime.
    pub async fn load_prices(&self) -> Result<LoadedPrices, AppError> {
        let dir = self.config.data_dir.clone();
        let history_days = self.config.history_days;
        tokio::task::spawn_blocking(move || load_price_dir(&dir, history_days))
            .await
            .map_err(|e| AppError::Internal(format!("price loader panicked: {}", e)))?
    }

    /// Score and classify the current price store.
    pub async fn report(&self) -> Result<RiskReport, AppError> {
        let loaded = self.load_prices().await?;
        Ok(self.analyzer.run(&loaded.series)?)
    }
}
