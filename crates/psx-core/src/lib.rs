//! # PSX Core
//!
//! Scraping, extraction and caching for the PSX market data API.
//!
//! ## Overview
//!
//! The exchange publishes prices only as HTML pages. This crate turns those
//! pages into typed records:
//!
//! - **Numeric parsing** tolerant of separators, `%` signs and `N/A`
//! - **Table location** by header text, not by position
//! - **Row extraction** for the indices, historical and constituent pages
//! - **Volume enrichment** of indices from their constituent pages
//! - **Source fallback** across dates and pages
//! - **Cache-fronted access** with a swappable TTL backend
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | PSX page orchestrator |
//! | [`cache`] | Cache backends and keys |
//! | [`config`] | Upstream URLs and scraping policy |
//! | [`domain`] | Index and stock records |
//! | [`error`] | Core error types |
//! | [`extract`] | Row extractors per page type |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`parse`] | HTML tables, column resolution, numbers |
//! | [`service`] | Cache-fronted accessor |
//! | [`source`] | Market source trait |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ MarketData      │────▶│ CacheBackend     │
//! │ Service         │     │ (memory / redis) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ PsxScraper      │────▶│ HttpClient       │
//! │ (MarketSource)  │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ parse + extract │
//! └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use psx_core::{MarketDataService, MemoryCache, PsxScraper, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = PsxScraper::from_config(ScraperConfig::from_env())?;
//!     let service = MarketDataService::new(Arc::new(scraper), Arc::new(MemoryCache::new()));
//!
//!     if let Some(index) = service.index("KSE100").await? {
//!         println!("KSE100: {:.2}", index.close);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod parse;
pub mod service;
pub mod source;

pub use adapters::{format_trade_date, PsxScraper};

pub use cache::{CacheBackend, CacheKey, MemoryCache, DEFAULT_TTL};
#[cfg(feature = "redis")]
pub use cache::RedisCache;

pub use config::{ScraperConfig, CONSTITUENT_INDICES};

pub use domain::{IndexRecord, IndicesPayload, StockRecord, StocksPayload, Symbol};

pub use error::{CacheError, ScrapeError, ValidationError};

pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

pub use service::MarketDataService;

pub use source::{MarketSource, SourceFuture};
