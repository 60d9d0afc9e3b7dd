//! # Domain Models
//!
//! Records served by the API, built fresh from every upstream fetch.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`IndexRecord`] | Index level with derived open and default high/low |
//! | [`StockRecord`] | Security price row, fields optional per source page |
//! | [`Symbol`] | Trimmed ticker with parenthetical suffix removed |
//! | [`IndicesPayload`] / [`StocksPayload`] | Collection response bodies |

mod models;
mod symbol;

pub use models::{IndexRecord, IndicesPayload, StockRecord, StocksPayload};
pub use symbol::{Symbol, MAX_SYMBOL_LEN};
