//! Excel file parser (xlsx, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDateTime, Timelike};

use crate::config::Config;
use crate::model::{columns_from_names, CellValue, Table};

use super::{header_names, Parser};

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        // Get sheet name
        let sheet_name = if let Some(ref name) = config.sheet_name {
            name.clone()
        } else {
            // Use first sheet
            let sheets = workbook.sheet_names();
            if sheets.is_empty() {
                bail!("No sheets found in workbook");
            }
            sheets[0].clone()
        };

        // Get the sheet range
        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        // Parse range into table
        parse_range(&range, config.skip_rows)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

/// Build a table from a sheet range, skipping `skip_rows` rows from the top of the sheet
fn parse_range(range: &Range<Data>, skip_rows: usize) -> Result<Table> {
    if range.is_empty() {
        bail!("Empty sheet");
    }

    // The range starts at the first non-empty row, which may already be past
    // some of the rows to skip
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = skip_rows.saturating_sub(first_row);
    let sheet_offset = first_row + skip;

    let mut rows = range.rows().skip(skip);
    let header_row = rows.next().context("No header row found")?;
    let header: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let mut table = Table::new(columns_from_names(header_names(&header)));

    // Read data rows
    for (i, row) in rows.enumerate() {
        let mut cells: Vec<CellValue> = row.iter().map(convert_cell).collect();

        // Pad with nulls if row has fewer columns
        if cells.len() < table.column_count() {
            cells.resize(table.column_count(), CellValue::Null);
        }

        // 1-indexed sheet row: offset rows, the header, then this row
        table.add_row(cells, sheet_offset + i + 2);
    }

    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

/// Midnight timestamps become plain dates
fn date_or_datetime(dt: NaiveDateTime) -> CellValue {
    if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
        CellValue::Date(dt.date())
    } else {
        CellValue::DateTime(dt)
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::Float(f) => {
            // Check if it's actually an integer
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => date_or_datetime(datetime),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                date_or_datetime(dt)
            } else if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                CellValue::Date(d)
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[Data]]) -> Range<Data> {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    #[test]
    fn test_skip_banner_rows() {
        let range = sheet(&[
            &[Data::String("Approved Quotes".into())],
            &[Data::Empty],
            &[Data::String("Project Name".into()), Data::String("Qty".into())],
            &[Data::String("Tower".into()), Data::Float(3.0)],
            &[Data::String("Annex".into()), Data::Float(1.5)],
        ]);
        let table = parse_range(&range, 2).unwrap();

        assert_eq!(table.column_names(), vec!["Project Name", "Qty"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cells[1], CellValue::Int(3));
        assert_eq!(table.rows[1].cells[1], CellValue::Float(1.5));
        assert_eq!(table.rows[0].source_line, 4);
    }

    #[test]
    fn test_convert_blank_string_is_null() {
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::Null);
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
    }

    #[test]
    fn test_midnight_is_date() {
        let cell = Data::DateTimeIso("2024-03-01T00:00:00".into());
        assert_eq!(
            convert_cell(&cell),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }
}
