//! Page parsing primitives shared by the row extractors.

pub mod html;
pub mod numeric;
pub mod table;

pub use html::{parse_tables, HtmlCell, HtmlTable};
pub use numeric::{parse_number, parse_percent};
pub use table::{locate_tables, resolve_columns, Column, ColumnMap, ColumnSpec, HeaderMatch};
