//! CoinGecko market-chart client.
//!
//! `GET {base}/coins/{id}/market_chart?vs_currency=usd&days=30` answers with
//! `{"prices": [[timestamp_ms, price], ...]}`, typically several samples per day.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cryptorisk_common::error::AppError;
use cryptorisk_common::types::SeriesError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Invalid series: {0}")]
    Series(#[from] SeriesError),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Series(e) => AppError::Series(e),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// One raw market-chart sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

#[derive(Deserialize)]
struct MarketChartResponse {
    prices: Option<Vec<(f64, f64)>>,
}

/// Parse a market-chart response body.
pub fn parse_market_chart(body: &str) -> Result<Vec<RawPricePoint>, FetchError> {
    let response: MarketChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let prices = response
        .prices
        .ok_or_else(|| FetchError::Parse("response has no \"prices\" field".to_string()))?;

    Ok(prices
        .into_iter()
        .map(|(ts, price)| RawPricePoint {
            timestamp_ms: ts as i64,
            price,
        })
        .collect())
}

/// HTTP client for the CoinGecko public API.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cryptorisk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the raw price history of `coin_id` over the last `days` days.
    pub async fn market_chart(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<RawPricePoint>, FetchError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin_id);
        let days = days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("vs_currency", vs_currency), ("days", days.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let points = parse_market_chart(&body)?;
        tracing::debug!(coin = coin_id, samples = points.len(), "Fetched market chart");
        Ok(points)
    }
}
