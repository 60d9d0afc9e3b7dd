use crate::parse::{locate_tables, Column, ColumnSpec, HeaderMatch, HtmlTable};
use crate::StockRecord;

use super::{first_non_empty, COMPANY_LINK_MARKER, SYMBOL_LABELS};

const HISTORICAL_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required(Column::Symbol, HeaderMatch::OneOf(SYMBOL_LABELS)),
    ColumnSpec::required(Column::Close, HeaderMatch::OneOf(&["CLOSE", "CURRENT"])),
    ColumnSpec::optional(Column::Open, HeaderMatch::OneOf(&["OPEN"])),
    ColumnSpec::optional(Column::High, HeaderMatch::OneOf(&["HIGH"])),
    ColumnSpec::optional(Column::Low, HeaderMatch::OneOf(&["LOW"])),
    ColumnSpec::optional(Column::Volume, HeaderMatch::OneOf(&["VOLUME"])),
    ColumnSpec::optional(Column::Change, HeaderMatch::ExactNoPercent("change")),
    ColumnSpec::optional(Column::ChangePercent, HeaderMatch::ContainsPercent("change")),
];

/// Full-market OHLCV rows of the historical page.
pub fn extract_historical(tables: &[HtmlTable]) -> Vec<StockRecord> {
    first_non_empty(locate_tables(tables, HISTORICAL_COLUMNS), |row| {
        let symbol = row.symbol(Some(COMPANY_LINK_MARKER))?;
        let close = row.number(Column::Close)?;

        Some(StockRecord {
            symbol,
            name: None,
            open: row.number(Column::Open),
            high: row.number(Column::High),
            low: row.number(Column::Low),
            close,
            volume: row.number(Column::Volume),
            change: row.number(Column::Change),
            change_percent: row.percent(Column::ChangePercent),
        })
    })
}
