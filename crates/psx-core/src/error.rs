use thiserror::Error;

use crate::http_client::{HttpError, HttpErrorKind};

/// Validation errors raised while building domain values from page text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
}

/// Failure of an upstream page fetch.
///
/// Empty or unrecognizable pages are not errors: extractors return no rows
/// and the orchestrator decides whether to fall back.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

impl ScrapeError {
    pub fn transport(url: impl Into<String>, source: HttpError) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Whether the upstream call ran out of time, as opposed to failing.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport { source, .. } if source.kind() == HttpErrorKind::Timeout
        )
    }
}

/// Cache backend failure. Callers treat these as misses.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
