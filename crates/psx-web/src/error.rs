use axum::extract::rejection::PathRejection;
use axum::http::header::ALLOW;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use psx_core::ScrapeError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// What a failed upstream fetch was for, as named in 503 bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Indices,
    Index,
    Stocks,
    Stock,
}

impl Resource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indices => "indices",
            Self::Index => "index",
            Self::Stocks => "stocks",
            Self::Stock => "stock",
        }
    }
}

/// Request failures mapped to JSON error bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing symbol")]
    MissingSymbol,

    /// Path segment that does not decode to UTF-8.
    #[error("Invalid symbol")]
    InvalidSymbol(#[from] PathRejection),

    #[error("Index not found")]
    IndexNotFound { symbol: String },

    #[error("Stock not found")]
    StockNotFound { symbol: String },

    #[error("Failed to fetch {}", .resource.as_str())]
    Upstream {
        resource: Resource,
        #[source]
        source: ScrapeError,
    },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    UnknownPath { path: String },
}

impl ApiError {
    pub fn upstream(resource: Resource) -> impl FnOnce(ScrapeError) -> Self {
        move |source| Self::Upstream { resource, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingSymbol | Self::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
            Self::IndexNotFound { .. } | Self::StockNotFound { .. } | Self::UnknownPath { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Upstream { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = match &self {
            Self::IndexNotFound { symbol } | Self::StockNotFound { symbol } => {
                json!({ "error": message, "symbol": symbol })
            }
            Self::Upstream { resource, source } => {
                error!(resource = resource.as_str(), error = %source, "upstream fetch failed");
                json!({ "error": message, "message": source.to_string() })
            }
            Self::UnknownPath { path } => json!({ "error": message, "path": path }),
            Self::InvalidSymbol(rejection) => {
                debug!(reason = %rejection.body_text(), "rejected symbol path");
                json!({ "error": message })
            }
            Self::MissingSymbol | Self::MethodNotAllowed => json!({ "error": message }),
        };

        let mut response = (self.status(), Json(body)).into_response();
        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, OPTIONS"));
        }
        response
    }
}

/// Startup failures of the server process, mapped to exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cache backend unavailable: {0}")]
    Cache(#[from] psx_core::CacheError),

    #[error("http client unavailable: {0}")]
    Http(#[from] psx_core::HttpError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Cache(_) => 3,
            Self::Http(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
