//! Cache-fronted access to a [`MarketSource`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheBackend, CacheKey, DEFAULT_TTL};
use crate::source::MarketSource;
use crate::{CacheError, IndexRecord, IndicesPayload, ScrapeError, StockRecord, StocksPayload};

/// Get-or-compute wrapper used by every API route.
///
/// Two concurrent misses for one key both reach the source; the last write
/// wins. Scrapes are idempotent so no locking is done.
#[derive(Clone)]
pub struct MarketDataService {
    source: Arc<dyn MarketSource>,
    cache: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl MarketDataService {
    pub fn new(source: Arc<dyn MarketSource>, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            source,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn indices(&self) -> Result<IndicesPayload, ScrapeError> {
        self.get_or_compute(&CacheKey::Indices, || async {
            let indices = self.source.indices().await?;
            Ok(IndicesPayload { indices })
        })
        .await
    }

    pub async fn stocks(&self) -> Result<StocksPayload, ScrapeError> {
        self.get_or_compute(&CacheKey::Stocks, || async {
            let stocks = self.source.stocks().await?;
            Ok(StocksPayload { stocks })
        })
        .await
    }

    /// One index by case-insensitive symbol. Misses are not cached.
    pub async fn index(&self, symbol: &str) -> Result<Option<IndexRecord>, ScrapeError> {
        let key = CacheKey::index(symbol);
        if let Some(record) = self.cached::<IndexRecord>(&key).await {
            return Ok(Some(record));
        }

        let found = self
            .source
            .indices()
            .await?
            .into_iter()
            .find(|record| record.symbol.eq_ignore_case(symbol));
        if let Some(record) = &found {
            self.store(&key, record).await;
        }
        Ok(found)
    }

    /// One stock by case-insensitive symbol. Misses are not cached.
    pub async fn stock(&self, symbol: &str) -> Result<Option<StockRecord>, ScrapeError> {
        let key = CacheKey::stock(symbol);
        if let Some(record) = self.cached::<StockRecord>(&key).await {
            return Ok(Some(record));
        }

        let found = self
            .source
            .stocks()
            .await?
            .into_iter()
            .find(|record| record.symbol.eq_ignore_case(symbol));
        if let Some(record) = &found {
            self.store(&key, record).await;
        }
        Ok(found)
    }

    /// Cached value for `key`, or the result of `compute` stored for the TTL.
    ///
    /// Errors from `compute` are returned and not cached.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, ScrapeError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        if let Some(value) = self.cached(key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.store(key, &value).await;
        Ok(value)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        let lookup = self
            .cache
            .get(&key)
            .await
            .and_then(|text| text.map(|text| decode(&text)).transpose());
        match lookup {
            Ok(Some(value)) => {
                debug!(%key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(%key, "cache miss");
                None
            }
            Err(error) => {
                warn!(%key, %error, "cache read failed");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let key = key.to_string();
        let written = match encode(value) {
            Ok(text) => self.cache.set(&key, text, self.ttl).await,
            Err(error) => Err(error),
        };
        if let Err(error) = written {
            warn!(%key, %error, "cache write failed");
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, CacheError> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CacheError> {
    Ok(serde_json::from_str(text)?)
}
