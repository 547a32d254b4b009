//! Ingestion adapters: read an export file into a [`Table`]
//!
//! These sit outside the snapshot engine, which only ever sees the
//! resulting table.

mod csv;
mod excel;

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ExcelParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed input"
        );
        Ok(table)
    }
}

/// Header names, with blanks replaced by positional names
pub(crate) fn header_names<I, S>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.as_ref().trim();
            if name.is_empty() {
                format!("Column{}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_by_extension() {
        let factory = ParserFactory::new();
        assert!(factory.get_parser(Path::new("quotes.xlsx")).is_ok());
        assert!(factory.get_parser(Path::new("quotes.CSV")).is_ok());
        assert!(factory.get_parser(Path::new("quotes.parquet")).is_err());
    }

    #[test]
    fn test_header_names() {
        assert_eq!(header_names(["id", " ", "name "]), vec!["id", "Column2", "name"]);
    }
}
