//! Upstream adapters.

mod psx;

pub use psx::{format_trade_date, PsxScraper};
