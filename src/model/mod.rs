//! Data model for tabular data representation

mod schema;
mod table;

pub use schema::{columns_from_names, Column};
pub use table::{CellValue, Row, Table};
