use crate::parse::{locate_tables, Column, ColumnSpec, HeaderMatch, HtmlTable};
use crate::IndexRecord;

use super::first_non_empty;

const INDEX_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required(Column::Symbol, HeaderMatch::Contains("index")),
    ColumnSpec::required(Column::Close, HeaderMatch::Contains("current")),
    ColumnSpec::optional(Column::High, HeaderMatch::OneOf(&["HIGH"])),
    ColumnSpec::optional(Column::Low, HeaderMatch::OneOf(&["LOW"])),
    ColumnSpec::optional(Column::Change, HeaderMatch::ContainsNoPercent("change")),
    ColumnSpec::optional(Column::ChangePercent, HeaderMatch::ContainsPercent("change")),
];

/// Index rows of the indices listing page.
///
/// The page has no opening level, so `open` is the previous close
/// (`close - change`) when the change is known.
pub fn extract_indices(tables: &[HtmlTable]) -> Vec<IndexRecord> {
    first_non_empty(locate_tables(tables, INDEX_COLUMNS), |row| {
        let symbol = row.symbol(None)?;
        let close = row.number(Column::Close)?;
        let change = row.number(Column::Change);
        let open = change
            .map(|change| close - change)
            .filter(|open| open.is_finite());

        Some(IndexRecord {
            symbol,
            name: None,
            open,
            high: row.number(Column::High).unwrap_or(close),
            low: row.number(Column::Low).unwrap_or(close),
            close,
            volume: None,
            change,
            change_percent: row.percent(Column::ChangePercent),
        })
    })
}
