//! Upstream endpoints and scraping policy.
//!
//! # Environment Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PSX_BASE_URL` | `https://dps.psx.com.pk` |
//! | `PSX_USER_AGENT` | `PSX-API/1.0` |
//! | `PSX_TIMEOUT_MS` | `5000` |
//! | `PSX_LOOKBACK_DAYS` | `7` |

use std::env;

use time::macros::offset;
use time::UtcOffset;

pub const DEFAULT_BASE_URL: &str = "https://dps.psx.com.pk";
pub const DEFAULT_USER_AGENT: &str = "PSX-API/1.0";

/// Indices with a dedicated constituent page, in fallback priority order.
pub const CONSTITUENT_INDICES: [&str; 3] = ["KSE100", "KSE30", "ALLSHR"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Exchange data portal, without trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout for every outbound call.
    pub timeout_ms: u64,
    /// How many days before today the historical page is tried.
    pub lookback_days: u32,
    pub constituent_indices: Vec<String>,
    /// Offset used to decide what "today" is on the exchange (PKT).
    pub utc_offset: UtcOffset,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_ms: 5_000,
            lookback_days: 7,
            constituent_indices: CONSTITUENT_INDICES.iter().map(|s| s.to_string()).collect(),
            utc_offset: offset!(+5),
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by `PSX_*` variables. Unparseable numbers keep
    /// their default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var("PSX_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(user_agent) = env::var("PSX_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout_ms) = env::var("PSX_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_ms = timeout_ms;
        }
        if let Some(days) = env::var("PSX_LOOKBACK_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.lookback_days = days;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn indices_url(&self) -> String {
        format!("{}/indices", self.base_url)
    }

    pub fn historical_url(&self) -> String {
        format!("{}/historical", self.base_url)
    }

    pub fn constituent_url(&self, index: &str) -> String {
        format!("{}/indices/{}", self.base_url, urlencoding::encode(index))
    }
}
