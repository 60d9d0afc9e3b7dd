use crate::parse::{locate_tables, parse_number, Column, ColumnSpec, HeaderMatch, HtmlTable};
use crate::StockRecord;

use super::{first_non_empty, COMPANY_LINK_MARKER, SYMBOL_LABELS};

const CONSTITUENT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required(Column::Symbol, HeaderMatch::OneOf(SYMBOL_LABELS)),
    ColumnSpec::required(Column::Close, HeaderMatch::OneOf(&["CURRENT"])),
    ColumnSpec::optional(Column::Name, HeaderMatch::OneOf(&["NAME"])),
    ColumnSpec::optional(Column::Ldcp, HeaderMatch::OneOf(&["LDCP"])),
    ColumnSpec::optional(Column::Change, HeaderMatch::ExactNoPercent("change")),
    ColumnSpec::optional(Column::ChangePercent, HeaderMatch::ContainsPercent("change")),
    ColumnSpec::optional(Column::Volume, HeaderMatch::OneOf(&["VOLUME"])),
];

const VOLUME_COLUMNS: &[ColumnSpec] = &[ColumnSpec::required(
    Column::Volume,
    HeaderMatch::OneOf(&["VOLUME"]),
)];

/// Member rows of an index constituent page.
///
/// LDCP (last day close) stands in for `open`. The page has no high/low
/// columns and those fields stay unknown.
pub fn extract_constituents(tables: &[HtmlTable]) -> Vec<StockRecord> {
    first_non_empty(locate_tables(tables, CONSTITUENT_COLUMNS), |row| {
        let symbol = row.symbol(Some(COMPANY_LINK_MARKER))?;
        let close = row.number(Column::Close)?;

        Some(StockRecord {
            symbol,
            name: row.text(Column::Name),
            open: row.number(Column::Ldcp),
            high: None,
            low: None,
            close,
            volume: row.number(Column::Volume),
            change: row.number(Column::Change),
            change_percent: row.percent(Column::ChangePercent),
        })
    })
}

/// Traded volume of an index: sum of the `VOLUME` column of the first
/// table whose sum is positive.
pub fn total_volume(tables: &[HtmlTable]) -> Option<f64> {
    locate_tables(tables, VOLUME_COLUMNS)
        .filter_map(|(table, columns)| {
            let column = columns.get(Column::Volume)?;
            let total: f64 = table
                .rows
                .iter()
                .filter_map(|cells| cells.get(column))
                .filter_map(|cell| parse_number(&cell.text))
                .sum();
            (total > 0.0).then_some(total)
        })
        .next()
}
