//! Route table and handlers.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /indices` | `{ "indices": [...] }` |
//! | `GET /indices/:symbol` | one index record |
//! | `GET /stocks` | `{ "stocks": [...] }` |
//! | `GET /stocks/:symbol` | one stock record |

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use psx_core::{IndexRecord, IndicesPayload, MarketDataService, StockRecord, StocksPayload};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::{ApiError, Resource};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketDataService>,
}

impl AppState {
    pub fn new(service: MarketDataService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Router with every API route, CORS header and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/indices", endpoint(get(list_indices)))
        .route("/indices/", endpoint(get(missing_symbol)))
        .route("/indices/:symbol", endpoint(get(get_index)))
        .route("/stocks", endpoint(get(list_stocks)))
        .route("/stocks/", endpoint(get(missing_symbol)))
        .route("/stocks/:symbol", endpoint(get(get_stock)))
        .fallback(unknown_path)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET handler plus the preflight and 405 answers shared by every route.
///
/// HEAD is answered explicitly; axum would otherwise run the GET handler.
fn endpoint(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route
        .head(method_not_allowed)
        .options(preflight)
        .fallback(method_not_allowed)
}

async fn list_indices(State(state): State<AppState>) -> Result<Json<IndicesPayload>, ApiError> {
    let payload = state
        .service
        .indices()
        .await
        .map_err(ApiError::upstream(Resource::Indices))?;
    Ok(Json(payload))
}

async fn get_index(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<IndexRecord>, ApiError> {
    let Path(raw) = path?;
    let symbol = requested_symbol(&raw)?;
    state
        .service
        .index(symbol)
        .await
        .map_err(ApiError::upstream(Resource::Index))?
        .map(Json)
        .ok_or_else(|| ApiError::IndexNotFound {
            symbol: symbol.to_owned(),
        })
}

async fn list_stocks(State(state): State<AppState>) -> Result<Json<StocksPayload>, ApiError> {
    let payload = state
        .service
        .stocks()
        .await
        .map_err(ApiError::upstream(Resource::Stocks))?;
    Ok(Json(payload))
}

async fn get_stock(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<StockRecord>, ApiError> {
    let Path(raw) = path?;
    let symbol = requested_symbol(&raw)?;
    state
        .service
        .stock(symbol)
        .await
        .map_err(ApiError::upstream(Resource::Stock))?
        .map(Json)
        .ok_or_else(|| ApiError::StockNotFound {
            symbol: symbol.to_owned(),
        })
}

fn requested_symbol(raw: &str) -> Result<&str, ApiError> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(ApiError::MissingSymbol);
    }
    Ok(symbol)
}

async fn missing_symbol() -> ApiError {
    ApiError::MissingSymbol
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS")],
    )
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn unknown_path(uri: Uri) -> ApiError {
    debug!(path = uri.path(), "no route");
    ApiError::UnknownPath {
        path: uri.path().to_owned(),
    }
}
