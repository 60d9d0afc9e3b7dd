//! Owned snapshot of the tables in an HTML document.
//!
//! `scraper::Html` is not `Send`, so pages are parsed synchronously into
//! plain values before any further `.await`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static HEAD_CELL: LazyLock<Selector> = LazyLock::new(|| selector("thead th"));
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static TH: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static TD: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must be valid CSS")
}

/// One `<td>` of a body row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlCell {
    /// Whitespace-collapsed text of the whole cell.
    pub text: String,
    /// Text of every anchor in the cell, concatenated; empty when there is none.
    pub anchor_text: String,
    /// Every anchor `href` in the cell, in document order.
    pub links: Vec<String>,
}

impl HtmlCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Header labels and body rows of one `<table>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<HtmlCell>>,
}

/// Every table of `html`, in document order.
pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    document.select(&TABLE).map(read_table).collect()
}

fn read_table(table: ElementRef<'_>) -> HtmlTable {
    let mut headers: Vec<String> = table.select(&HEAD_CELL).map(element_text).collect();
    if headers.is_empty() {
        headers = table
            .select(&ROW)
            .map(|row| row.select(&TH).map(element_text).collect::<Vec<_>>())
            .find(|cells| !cells.is_empty())
            .unwrap_or_default();
    }

    let mut body: Vec<ElementRef<'_>> = table.select(&BODY_ROW).collect();
    if body.is_empty() {
        body = table.select(&ROW).collect();
    }

    let rows = body
        .into_iter()
        .map(|row| row.select(&TD).map(read_cell).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    HtmlTable { headers, rows }
}

fn read_cell(cell: ElementRef<'_>) -> HtmlCell {
    let anchors: Vec<ElementRef<'_>> = cell.select(&ANCHOR).collect();
    HtmlCell {
        text: element_text(cell),
        anchor_text: anchors.iter().map(|a| element_text(*a)).collect(),
        links: anchors
            .iter()
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_owned)
            .collect(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_rows_and_links() {
        let html = r#"
            <html><body>
              <table id="nav"><tr><td>menu</td></tr></table>
              <table>
                <thead><tr><th> SYMBOL </th><th>CHANGE
                  (%)</th></tr></thead>
                <tbody>
                  <tr><td><a href="/company/HBL">HBL</a> <span>Habib Bank</span></td><td>1.5%</td></tr>
                  <tr></tr>
                </tbody>
              </table>
            </body></html>"#;

        let tables = parse_tables(html);
        assert_eq!(tables.len(), 2);
        assert!(tables[0].headers.is_empty());
        assert_eq!(tables[0].rows.len(), 1);

        let quotes = &tables[1];
        assert_eq!(quotes.headers, vec!["SYMBOL", "CHANGE (%)"]);
        assert_eq!(quotes.rows.len(), 1);
        let cell = &quotes.rows[0][0];
        assert_eq!(cell.text, "HBL Habib Bank");
        assert_eq!(cell.anchor_text, "HBL");
        assert_eq!(cell.links, vec!["/company/HBL"]);
    }

    #[test]
    fn falls_back_to_first_th_row_without_thead() {
        let html = r#"
            <table>
              <tr><th>Index</th><th>Current</th></tr>
              <tr><td>KSE100</td><td>100</td></tr>
            </table>"#;

        let tables = parse_tables(html);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["Index", "Current"]);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[0].rows[0][1].text, "100");
    }

    #[test]
    fn anchor_text_joins_every_anchor_in_the_cell() {
        let html = r#"
            <table><thead><tr><th>SYMBOL</th></tr></thead>
              <tbody><tr><td><a href="/company/BAFL">BAFL</a><a href="/company/BAFL#xd">-XD</a></td></tr></tbody>
            </table>"#;

        let cell = &parse_tables(html)[0].rows[0][0];
        assert_eq!(cell.anchor_text, "BAFL-XD");
        assert_eq!(cell.links.len(), 2);
    }

    #[test]
    fn document_without_tables_yields_nothing() {
        assert!(parse_tables("<p>maintenance</p>").is_empty());
        assert!(parse_tables("").is_empty());
    }
}
