//! Market data source contract.
//!
//! The cache-fronted accessor and the HTTP surface only see this trait;
//! [`PsxScraper`](crate::adapters::PsxScraper) is the production
//! implementation.

use std::future::Future;
use std::pin::Pin;

use crate::{IndexRecord, ScrapeError, StockRecord};

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ScrapeError>> + Send + 'a>>;

/// Source of fresh index and stock records.
///
/// Implementations must be `Send + Sync` as they are shared across request
/// handlers.
pub trait MarketSource: Send + Sync {
    /// All indices of the listing page.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] when the listing page cannot be fetched.
    fn indices<'a>(&'a self) -> SourceFuture<'a, Vec<IndexRecord>>;

    /// All stocks, from the best source available.
    ///
    /// Exhausting every source yields an empty list, not an error.
    fn stocks<'a>(&'a self) -> SourceFuture<'a, Vec<StockRecord>>;
}
