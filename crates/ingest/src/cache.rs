//! Fetch cache — Redis-backed, time-boxed memoization of market-chart responses.
//!
//! Uses Redis `SET key value EX ttl` so entries expire on their own. The risk
//! engine never sees this layer; it only receives materialized series.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::coingecko::{FetchError, RawPricePoint};

/// Redis-backed cache of raw price histories.
#[derive(Clone)]
pub struct PriceCache {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl PriceCache {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self, FetchError> {
        let client = Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        tracing::info!(ttl_secs, "Connected to Redis fetch cache");
        Ok(Self { redis, ttl_secs })
    }

    pub fn key(coin_id: &str, vs_currency: &str, days: u32) -> String {
        format!("prices:{}:{}:{}", coin_id, vs_currency, days)
    }

    /// Cached samples, or `None` on a miss.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<RawPricePoint>>, FetchError> {
        let mut redis = self.redis.clone();
        let cached: Option<String> = redis.get(key).await?;

        match cached {
            Some(json) => {
                let points = serde_json::from_str(&json)
                    .map_err(|e| FetchError::Parse(format!("corrupt cache entry {}: {}", key, e)))?;
                Ok(Some(points))
            }
            None => Ok(None),
        }
    }

    /// Store samples under `key` for the configured TTL.
    pub async fn put(&self, key: &str, points: &[RawPricePoint]) -> Result<(), FetchError> {
        let json = serde_json::to_string(points).map_err(|e| FetchError::Parse(e.to_string()))?;
        let mut redis = self.redis.clone();

        // SET key json EX ttl
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut redis)
            .await?;

        Ok(())
    }

    /// Drop a cached entry.
    pub async fn invalidate(&self, key: &str) -> Result<(), FetchError> {
        let mut redis = self.redis.clone();
        redis.del::<_, ()>(key).await?;
        Ok(())
    }
}
