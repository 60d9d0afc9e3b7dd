//! Server options.
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--bind` | `BIND_ADDR` | `0.0.0.0` |
//! | `--port` | `PORT` | `3000` |
//! | `--cache-ttl-secs` | `CACHE_TTL_SECS` | `300` |
//! | `--redis-url` | `REDIS_URL` | unset (in-memory cache) |
//!
//! Upstream scraping is configured through `PSX_*` variables, see
//! [`psx_core::ScraperConfig::from_env`].

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;

/// PSX market data API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "psx-api", version, about = "JSON API over scraped PSX market data")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Lifetime of cached responses in seconds.
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// Redis connection URL. Requires the `redis` feature.
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,
}

impl Cli {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
