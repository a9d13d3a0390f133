use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Tunable parameters of the risk-scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RiskParameters {
    /// Rolling volatility window, in daily returns (default: 7)
    pub rolling_window: usize,

    /// Weight of the overall volatility in the risk score (default: 0.6)
    pub overall_weight: f64,

    /// Weight of the average rolling volatility in the risk score (default: 0.4)
    pub rolling_weight: f64,

    /// Percentile separating Stable from Alert (default: 0.30)
    pub low_percentile: f64,

    /// Percentile separating Alert from Extreme (default: 0.70)
    pub high_percentile: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            rolling_window: 7,
            overall_weight: 0.6,
            rolling_weight: 0.4,
            low_percentile: 0.30,
            high_percentile: 0.70,
        }
    }
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// CoinGecko REST base URL
    pub coingecko_api_url: String,

    /// Quote currency for market data (default: usd)
    pub vs_currency: String,

    /// Days of history requested per asset (default: 30)
    pub history_days: u32,

    /// CoinGecko coin ids making up the asset universe
    pub assets: Vec<String>,

    /// Directory holding one price CSV per asset
    pub data_dir: PathBuf,

    /// Output path of the flat risk table
    pub report_path: PathBuf,

    /// Redis connection string; the fetch cache is disabled when unset
    pub redis_url: Option<String>,

    /// TTL of cached market-chart responses in seconds (default: 3600)
    pub fetch_cache_ttl_secs: u64,

    /// Per-request HTTP timeout in seconds (default: 10)
    pub http_timeout_secs: u64,

    /// Port the API server binds to (default: 3000)
    pub api_port: u16,

    /// Engine parameters
    pub risk: RiskParameters,
}

pub const DEFAULT_ASSETS: &[&str] = &["bitcoin", "ethereum", "solana", "cardano", "dogecoin"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            coingecko_api_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            history_days: 30,
            assets: DEFAULT_ASSETS.iter().map(|a| a.to_string()).collect(),
            data_dir: PathBuf::from("data"),
            report_path: PathBuf::from("final_risk_analysis.csv"),
            redis_url: None,
            fetch_cache_ttl_secs: 3600,
            http_timeout_secs: 10,
            api_port: 3000,
            risk: RiskParameters::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let default_risk = defaults.risk;

        let assets = match lookup("ASSETS") {
            Some(raw) => parse_assets(&raw)?,
            None => defaults.assets,
        };

        Ok(Self {
            coingecko_api_url: lookup("COINGECKO_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.coingecko_api_url),
            vs_currency: lookup("VS_CURRENCY").unwrap_or(defaults.vs_currency),
            history_days: parse_var(&lookup, "HISTORY_DAYS", defaults.history_days)?,
            assets,
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            report_path: lookup("REPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.report_path),
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
            fetch_cache_ttl_secs: parse_var(
                &lookup,
                "FETCH_CACHE_TTL_SECS",
                defaults.fetch_cache_ttl_secs,
            )?,
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            api_port: parse_var(&lookup, "API_PORT", defaults.api_port)?,
            risk: RiskParameters {
                rolling_window: parse_var(&lookup, "ROLLING_WINDOW", default_risk.rolling_window)?,
                overall_weight: parse_var(&lookup, "OVERALL_WEIGHT", default_risk.overall_weight)?,
                rolling_weight: parse_var(&lookup, "ROLLING_WEIGHT", default_risk.rolling_weight)?,
                low_percentile: parse_var(&lookup, "LOW_PERCENTILE", default_risk.low_percentile)?,
                high_percentile: parse_var(
                    &lookup,
                    "HIGH_PERCENTILE",
                    default_risk.high_percentile,
                )?,
            },
        })
    }

    /// File holding the stored price history of `asset`.
    pub fn price_file(&self, asset: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}_price_{}_days.csv", asset, self.history_days))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn parse_assets(raw: &str) -> anyhow::Result<Vec<String>> {
    let assets: Vec<String> = raw
        .split(',')
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();

    if assets.is_empty() {
        anyhow::bail!("ASSETS must list at least one coin id");
    }
    Ok(assets)
}
