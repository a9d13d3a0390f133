use std::time::Duration;

use cryptorisk_common::config::AppConfig;
use cryptorisk_common::types::PriceSeries;

use crate::aggregate::daily_series;
use crate::cache::PriceCache;
use crate::coingecko::{CoinGeckoClient, FetchError, RawPricePoint};

/// A coin whose history could not be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub asset: String,
    pub reason: String,
}

/// Result of fetching a whole asset universe.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Successfully fetched series, in request order
    pub series: Vec<PriceSeries>,
    pub failures: Vec<FetchFailure>,
}

/// Fetches daily price series, consulting the optional cache first.
#[derive(Clone)]
pub struct PriceFetcher {
    client: CoinGeckoClient,
    cache: Option<PriceCache>,
    vs_currency: String,
    days: u32,
}

impl PriceFetcher {
    pub fn new(client: CoinGeckoClient, vs_currency: impl Into<String>, days: u32) -> Self {
        Self {
            client,
            cache: None,
            vs_currency: vs_currency.into(),
            days,
        }
    }

    pub fn with_cache(mut self, cache: PriceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a fetcher from configuration. An unreachable Redis disables the
    /// cache instead of failing startup.
    pub async fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let client = CoinGeckoClient::new(
            config.coingecko_api_url.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?;
        let fetcher = Self::new(client, config.vs_currency.clone(), config.history_days);

        let Some(redis_url) = config.redis_url.as_deref() else {
            tracing::info!("REDIS_URL not set, fetch cache disabled");
            return Ok(fetcher);
        };

        match PriceCache::connect(redis_url, config.fetch_cache_ttl_secs).await {
            Ok(cache) => Ok(fetcher.with_cache(cache)),
            Err(e) => {
                tracing::warn!(error = %e, "Fetch cache unavailable, continuing without it");
                Ok(fetcher)
            }
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Raw samples for `coin_id`, from cache when fresh.
    pub async fn fetch_raw(&self, coin_id: &str) -> Result<Vec<RawPricePoint>, FetchError> {
        let key = PriceCache::key(coin_id, &self.vs_currency, self.days);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(points)) => {
                    tracing::debug!(coin = coin_id, "Fetch cache hit");
                    return Ok(points);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(coin = coin_id, error = %e, "Fetch cache read failed"),
            }
        }

        let points = self
            .client
            .market_chart(coin_id, &self.vs_currency, self.days)
            .await?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(&key, &points).await
        {
            tracing::warn!(coin = coin_id, error = %e, "Fetch cache write failed");
        }

        Ok(points)
    }

    /// Daily series for `coin_id`.
    pub async fn fetch_series(&self, coin_id: &str) -> Result<PriceSeries, FetchError> {
        let raw = self.fetch_raw(coin_id).await?;
        daily_series(coin_id, &raw)
    }

    /// Fetch every coin in turn. A failing coin is logged and recorded, the
    /// rest still run.
    pub async fn fetch_all(&self, coin_ids: &[String]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for coin_id in coin_ids {
            match self.fetch_series(coin_id).await {
                Ok(series) => {
                    tracing::info!(coin = %coin_id, days = series.len(), "Price history fetched");
                    outcome.series.push(series);
                }
                Err(e) => {
                    tracing::error!(coin = %coin_id, error = %e, "Price history fetch failed");
                    outcome.failures.push(FetchFailure {
                        asset: coin_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}
