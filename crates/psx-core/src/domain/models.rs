use serde::{Deserialize, Serialize};

use crate::Symbol;

/// One row of the exchange's indices listing.
///
/// `high`/`low` always carry a value: when the page has no such columns
/// they repeat `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

/// One traded security. Every field except `symbol` and `close` depends on
/// which page the row came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

impl StockRecord {
    /// Record with only the mandatory fields set.
    pub fn new(symbol: Symbol, close: f64) -> Self {
        Self {
            symbol,
            name: None,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            change: None,
            change_percent: None,
        }
    }
}

/// Body of `GET /indices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicesPayload {
    pub indices: Vec<IndexRecord>,
}

/// Body of `GET /stocks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StocksPayload {
    pub stocks: Vec<StockRecord>,
}
