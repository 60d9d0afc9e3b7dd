//! Header-driven column resolution.
//!
//! Exchange pages carry many tables (navigation, tickers, footers) and
//! relabel columns between pages. Tables are selected by the semantic
//! columns their headers expose, never by position.

use std::collections::HashMap;

use super::html::HtmlTable;

/// Semantic column of a price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Symbol,
    Name,
    Open,
    High,
    Low,
    Close,
    Ldcp,
    Change,
    ChangePercent,
    Volume,
}

/// Case-insensitive predicate over one header label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    /// Label contains the needle.
    Contains(&'static str),
    /// Label equals one of the candidates.
    OneOf(&'static [&'static str]),
    /// Label contains the needle and a `%` marker.
    ContainsPercent(&'static str),
    /// Label contains the needle and no `%` marker.
    ContainsNoPercent(&'static str),
    /// Label equals the needle once a parenthetical unit such as `(Rs.)` is
    /// dropped, and carries no `%` marker. `CHANGE (%)` never matches.
    ExactNoPercent(&'static str),
}

impl HeaderMatch {
    pub fn matches(self, header: &str) -> bool {
        let label = header.trim().to_ascii_uppercase();
        match self {
            Self::Contains(needle) => label.contains(&needle.to_ascii_uppercase()),
            Self::OneOf(candidates) => candidates
                .iter()
                .any(|candidate| label == candidate.to_ascii_uppercase()),
            Self::ContainsPercent(needle) => {
                label.contains(&needle.to_ascii_uppercase()) && label.contains('%')
            }
            Self::ContainsNoPercent(needle) => {
                label.contains(&needle.to_ascii_uppercase()) && !label.contains('%')
            }
            Self::ExactNoPercent(needle) => {
                let head = label.split('(').next().unwrap_or_default().trim();
                !label.contains('%') && head == needle.to_ascii_uppercase()
            }
        }
    }
}

/// One column a table may or must expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column: Column,
    pub matcher: HeaderMatch,
    pub required: bool,
}

impl ColumnSpec {
    pub const fn required(column: Column, matcher: HeaderMatch) -> Self {
        Self {
            column,
            matcher,
            required: true,
        }
    }

    pub const fn optional(column: Column, matcher: HeaderMatch) -> Self {
        Self {
            column,
            matcher,
            required: false,
        }
    }
}

/// Column index of every resolved column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<Column, usize>,
}

impl ColumnMap {
    /// `None` means the table has no such column; rows leave the field unknown.
    pub fn get(&self, column: Column) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    pub fn contains(&self, column: Column) -> bool {
        self.indices.contains_key(&column)
    }
}

/// Map each spec to the first header it matches.
///
/// Returns `None` when a required column has no matching header.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S], specs: &[ColumnSpec]) -> Option<ColumnMap> {
    let mut indices = HashMap::with_capacity(specs.len());
    for spec in specs {
        let position = headers
            .iter()
            .position(|header| spec.matcher.matches(header.as_ref()));
        match position {
            Some(index) => {
                indices.insert(spec.column, index);
            }
            None if spec.required => return None,
            None => {}
        }
    }
    Some(ColumnMap { indices })
}

/// Tables whose headers satisfy every required spec, in document order.
pub fn locate_tables<'a>(
    tables: &'a [HtmlTable],
    specs: &'a [ColumnSpec],
) -> impl Iterator<Item = (&'a HtmlTable, ColumnMap)> + 'a {
    tables.iter().filter_map(move |table| {
        resolve_columns(&table.headers, specs).map(|columns| (table, columns))
    })
}
