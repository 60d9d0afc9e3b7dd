//! Row extractors: located table -> domain records.
//!
//! | Extractor | Page | Notes |
//! |-----------|------|-------|
//! | [`extract_indices`] | `/indices` | open derived from change, high/low default to close |
//! | [`extract_historical`] | `/historical` (POST) | only source with real stock high/low |
//! | [`extract_constituents`] | `/indices/<ID>` | LDCP as open, never high/low |
//!
//! Every extractor returns the rows of the first table that yields at least
//! one record. A page with no matching table yields an empty vector.

mod constituents;
mod historical;
mod indices;

pub use constituents::{extract_constituents, total_volume};
pub use historical::extract_historical;
pub use indices::extract_indices;

use crate::parse::{parse_number, parse_percent, Column, ColumnMap, HtmlCell, HtmlTable};
use crate::Symbol;

/// Link path marker of per-company pages, e.g. `/company/HBL`.
pub const COMPANY_LINK_MARKER: &str = "/company/";

/// Ticker labels seen across the historical and constituent pages.
pub(crate) const SYMBOL_LABELS: &[&str] = &["SYMBOL", "SCRIPT", "SCRIP"];

/// Symbol of a row.
///
/// Prefers the identifier in a link containing `link_marker` because the
/// display text may carry the full company name; then the anchor text; then
/// the cell text.
pub fn resolve_symbol(cell: &HtmlCell, link_marker: Option<&str>) -> Option<Symbol> {
    let from_link = link_marker.and_then(|marker| {
        cell.links
            .iter()
            .find_map(|href| identifier_after(href, marker))
    });

    let raw = match from_link {
        Some(id) => id,
        None if !cell.anchor_text.trim().is_empty() => cell.anchor_text.clone(),
        None => cell.text.clone(),
    };

    Symbol::parse(&raw).ok()
}

fn identifier_after(href: &str, marker: &str) -> Option<String> {
    let lower = href.to_ascii_lowercase();
    let start = lower.find(&marker.to_ascii_lowercase())? + marker.len();
    let rest = &href[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let segment = rest[..end].trim();
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| segment.to_owned());
    Some(decoded)
}

/// Row view bound to the resolved columns of its table.
pub(crate) struct Row<'a> {
    cells: &'a [HtmlCell],
    columns: &'a ColumnMap,
}

impl<'a> Row<'a> {
    pub(crate) fn new(cells: &'a [HtmlCell], columns: &'a ColumnMap) -> Self {
        Self { cells, columns }
    }

    pub(crate) fn cell(&self, column: Column) -> Option<&'a HtmlCell> {
        self.columns.get(column).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn number(&self, column: Column) -> Option<f64> {
        self.cell(column).and_then(|cell| parse_number(&cell.text))
    }

    pub(crate) fn percent(&self, column: Column) -> Option<f64> {
        self.cell(column).and_then(|cell| parse_percent(&cell.text))
    }

    pub(crate) fn text(&self, column: Column) -> Option<String> {
        self.cell(column)
            .map(|cell| cell.text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }

    pub(crate) fn symbol(&self, link_marker: Option<&str>) -> Option<Symbol> {
        self.cell(Column::Symbol)
            .and_then(|cell| resolve_symbol(cell, link_marker))
    }
}

/// Rows of the first located table that produce at least one record.
pub(crate) fn first_non_empty<'a, T, I, F>(located: I, mut build: F) -> Vec<T>
where
    I: IntoIterator<Item = (&'a HtmlTable, ColumnMap)>,
    F: FnMut(&Row<'_>) -> Option<T>,
{
    for (table, columns) in located {
        let records: Vec<T> = table
            .rows
            .iter()
            .filter_map(|cells| build(&Row::new(cells, &columns)))
            .collect();
        if !records.is_empty() {
            return records;
        }
    }
    Vec::new()
}
