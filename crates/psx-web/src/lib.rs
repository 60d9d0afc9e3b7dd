//! # PSX Web
//!
//! HTTP JSON surface of the PSX market data API.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Routes, handlers and middleware |
//! | [`cli`] | Server options |
//! | [`error`] | Error-to-response mapping |

pub mod api;
pub mod cli;
pub mod error;

use std::sync::Arc;

use psx_core::{CacheBackend, MemoryCache};
use tracing::info;

pub use api::{router, AppState};
pub use cli::Cli;
pub use error::{ApiError, ServerError};

/// Cache backend chosen once for the lifetime of the process.
pub async fn cache_backend(cli: &Cli) -> Result<Arc<dyn CacheBackend>, ServerError> {
    #[cfg(feature = "redis")]
    if let Some(url) = &cli.redis_url {
        let cache = psx_core::RedisCache::connect(url).await?;
        info!("using redis cache");
        return Ok(Arc::new(cache));
    }

    #[cfg(not(feature = "redis"))]
    if cli.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but the server was built without the `redis` feature");
    }

    info!("using in-memory cache");
    Ok(Arc::new(MemoryCache::new()))
}
