//! Short-lived response cache.
//!
//! [`CacheBackend`] is a capability interface over a key/value store with
//! expiry. [`MemoryCache`] keeps entries in process; [`RedisCache`] (feature
//! `redis`) uses an external server so that several API instances share
//! one cache. The backend is chosen once at startup.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::CacheError;

/// Default time-to-live of every cached value.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + Send + 'a>>;

/// Key/value store with per-entry expiry. Values are JSON text.
pub trait CacheBackend: Send + Sync {
    /// Value stored under `key`, `None` when absent or expired.
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

    /// Store `value` under `key` for `ttl`, replacing any previous value.
    fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> CacheFuture<'a, ()>;
}

/// Cache keys used by the accessor. Symbols are uppercased so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    Indices,
    Index(String),
    Stocks,
    Stock(String),
}

impl CacheKey {
    pub fn index(symbol: &str) -> Self {
        Self::Index(symbol.trim().to_ascii_uppercase())
    }

    pub fn stock(symbol: &str) -> Self {
        Self::Stock(symbol.trim().to_ascii_uppercase())
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indices => f.write_str("indices"),
            Self::Index(symbol) => write!(f, "indices:{symbol}"),
            Self::Stocks => f.write_str("stocks"),
            Self::Stock(symbol) => write!(f, "stocks:{symbol}"),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// In-process cache shared by every handler of one server.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<tokio::sync::RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired entries from the cache.
    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl CacheBackend for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
        Box::pin(async move {
            let now = Instant::now();
            {
                let store = self.inner.read().await;
                match store.get(key) {
                    None => return Ok(None),
                    Some(entry) if now <= entry.expires_at => return Ok(Some(entry.body.clone())),
                    Some(_) => {}
                }
            }

            // Expired: evict unless a writer refreshed it meanwhile.
            let mut store = self.inner.write().await;
            if store.get(key).is_some_and(|entry| entry.expires_at < now) {
                store.remove(key);
            }
            Ok(None)
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            let entry = CacheEntry {
                body: value,
                expires_at: Instant::now() + ttl,
            };
            self.inner.write().await.insert(key.to_owned(), entry);
            Ok(())
        })
    }
}

#[cfg(feature = "redis")]
pub use redis_backend::RedisCache;

#[cfg(feature = "redis")]
mod redis_backend {
    use std::time::Duration;

    use redis::AsyncCommands;

    use super::{CacheBackend, CacheFuture};
    use crate::CacheError;

    /// Cache stored in a Redis server, expiry handled by `SET EX`.
    #[derive(Clone)]
    pub struct RedisCache {
        connection: redis::aio::MultiplexedConnection,
    }

    impl RedisCache {
        pub async fn connect(url: &str) -> Result<Self, CacheError> {
            let client = redis::Client::open(url).map_err(backend_error)?;
            let connection = client
                .get_multiplexed_async_connection()
                .await
                .map_err(backend_error)?;
            Ok(Self { connection })
        }
    }

    impl CacheBackend for RedisCache {
        fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
            Box::pin(async move {
                let mut connection = self.connection.clone();
                let value: Option<String> = connection.get(key).await.map_err(backend_error)?;
                Ok(value)
            })
        }

        fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> CacheFuture<'a, ()> {
            Box::pin(async move {
                let mut connection = self.connection.clone();
                let seconds = ttl.as_secs().max(1);
                let () = connection
                    .set_ex(key, value, seconds)
                    .await
                    .map_err(backend_error)?;
                Ok(())
            })
        }
    }

    fn backend_error(error: redis::RedisError) -> CacheError {
        CacheError::Backend(error.to_string())
    }
}
