//! CSV file parser

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{columns_from_names, CellValue, Table};

use super::{header_names, Parser};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        read_table(BufReader::new(file), delimiter, config.skip_rows)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Read a delimited table, skipping `skip_rows` banner rows above the header
fn read_table<R: Read>(reader: R, delimiter: u8, skip_rows: usize) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut records = csv_reader.records().skip(skip_rows);

    // Read headers
    let headers = records
        .next()
        .context("No header row found")?
        .context("Failed to read CSV headers")?;
    let mut table = Table::new(columns_from_names(header_names(headers.iter())));

    // Lines consumed before the first data row: banner rows plus the header
    let offset = skip_rows + 1;

    // Read rows
    for (i, result) in records.enumerate() {
        let line = offset + i + 1;
        let record = result.with_context(|| format!("Failed to read CSV row {}", line))?;

        let mut cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();

        // Pad with nulls if row has fewer columns
        if cells.len() < table.column_count() {
            cells.resize(table.column_count(), CellValue::Null);
        }

        table.add_row(cells, line);
    }

    Ok(table)
}

/// Parse a string value into a CellValue with type inference
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        return CellValue::Null;
    }

    // Try parsing as boolean
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    // Try parsing as integer
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    // Try parsing as float
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    // Try parsing as date
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // Try parsing as datetime (ISO 8601)
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    // Default to string
    CellValue::String(Cow::Owned(trimmed.to_string()))
}
