//! Grouped reports of changed records
//!
//! Records are clustered by the distinct values of a set of group columns
//! (the "project"), in the order each group is first seen. Each group carries
//! its matching records projected onto the detail columns, in input order.

mod html;
mod json;
mod terminal;

use std::io::Write;

use anyhow::Result;
use indexmap::IndexMap;

use crate::config::OutputFormat;
use crate::error::ReportError;
use crate::model::{CellValue, Column};
use crate::snapshot::Record;

pub use html::HtmlOutput;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// One project group: its key values and projected detail rows
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGroup {
    /// Values of the group columns, in group column order
    pub key: Vec<CellValue>,
    /// Detail rows, each in detail column order
    pub rows: Vec<Vec<CellValue>>,
}

/// Records grouped by project
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub group_columns: Vec<String>,
    pub detail_columns: Vec<String>,
    pub groups: Vec<ProjectGroup>,
}

impl Report {
    /// Number of detail rows over all groups
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }
}

/// A labelled report, e.g. the `Added` records of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub label: String,
    pub report: Report,
}

/// Builds grouped reports
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    group_columns: Vec<String>,
    detail_columns: Vec<String>,
}

impl ReportFormatter {
    pub fn new(group_columns: Vec<String>, detail_columns: Vec<String>) -> Self {
        Self {
            group_columns,
            detail_columns,
        }
    }

    /// Check that every configured column exists in `columns`
    pub fn validate(&self, columns: &[Column]) -> Result<(), ReportError> {
        resolve(columns, &self.group_columns, "group")?;
        resolve(columns, &self.detail_columns, "detail")?;
        Ok(())
    }

    /// Group `records`, which follow the schema `columns`.
    ///
    /// A configured column missing from `columns` projects as null, so
    /// records saved under an older schema still report every group.
    pub fn format(&self, columns: &[Column], records: &[Record]) -> Report {
        let group_idx = lookup(columns, &self.group_columns);
        let detail_idx = lookup(columns, &self.detail_columns);

        let mut groups: IndexMap<Vec<CellValue>, Vec<Vec<CellValue>>> = IndexMap::new();
        for record in records {
            let key = project(record, &group_idx);
            let detail = project(record, &detail_idx);
            groups.entry(key).or_default().push(detail);
        }

        Report {
            group_columns: self.group_columns.clone(),
            detail_columns: self.detail_columns.clone(),
            groups: groups
                .into_iter()
                .map(|(key, rows)| ProjectGroup { key, rows })
                .collect(),
        }
    }
}

fn resolve(columns: &[Column], names: &[String], role: &'static str) -> Result<(), ReportError> {
    match lookup(columns, names).iter().position(Option::is_none) {
        Some(missing) => Err(ReportError::UnknownColumn {
            role,
            name: names[missing].clone(),
        }),
        None => Ok(()),
    }
}

fn lookup(columns: &[Column], names: &[String]) -> Vec<Option<usize>> {
    names
        .iter()
        .map(|name| columns.iter().position(|c| &c.name == name))
        .collect()
}

fn project(record: &Record, indices: &[Option<usize>]) -> Vec<CellValue> {
    indices
        .iter()
        .map(|idx| {
            idx.and_then(|i| record.get(i))
                .cloned()
                .unwrap_or(CellValue::Null)
        })
        .collect()
}

/// Trait for report renderers
pub trait ReportRenderer {
    /// Render report sections to a writer. No sections means no differences.
    fn render(&self, sections: &[ReportSection], writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating renderers
pub struct RendererFactory;

impl RendererFactory {
    /// Create a renderer based on format type
    pub fn create(format: OutputFormat, color: bool) -> Box<dyn ReportRenderer> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new(color)),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Html => Box::new(HtmlOutput::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{columns_from_names, Table};
    use crate::snapshot::Snapshot;

    fn records(rows: &[(&str, &str, &str, i64)]) -> (Vec<Column>, Vec<Record>) {
        let mut table = Table::new(columns_from_names(["Rep", "Project", "SKU", "Qty"]));
        for (i, (rep, project, sku, qty)) in rows.iter().enumerate() {
            table.add_row(vec![(*rep).into(), (*project).into(), (*sku).into(), (*qty).into()], i + 2);
        }
        let snapshot = Snapshot::from_table(&table).unwrap();
        (snapshot.columns().to_vec(), snapshot.records().cloned().collect())
    }

    fn formatter() -> ReportFormatter {
        ReportFormatter::new(
            vec!["Rep".into(), "Project".into()],
            vec!["SKU".into(), "Qty".into()],
        )
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let (columns, records) = records(&[
            ("Bo", "Tower", "A-1", 2),
            ("Al", "Annex", "B-1", 1),
            ("Bo", "Tower", "A-2", 5),
            ("Al", "Barn", "C-1", 3),
        ]);
        let report = formatter().format(&columns, &records);

        let keys: Vec<_> = report.groups.iter().map(|g| g.key[1].to_string()).collect();
        assert_eq!(keys, vec!["Tower", "Annex", "Barn"]);
        assert_eq!(
            report.groups[0].rows,
            vec![
                vec![CellValue::from("A-1"), CellValue::Int(2)],
                vec![CellValue::from("A-2"), CellValue::Int(5)],
            ]
        );
        assert_eq!(report.row_count(), 4);
    }

    #[test]
    fn test_formatting_is_stable() {
        let (columns, records) = records(&[("Bo", "Tower", "A-1", 2), ("Al", "Annex", "B-1", 1)]);
        let first = formatter().format(&columns, &records);
        let second = formatter().format(&columns, &records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_full_key_separates_groups() {
        let (columns, records) = records(&[("Bo", "Tower", "A-1", 2), ("Al", "Tower", "A-1", 2)]);
        let report = formatter().format(&columns, &records);
        assert_eq!(report.groups.len(), 2);
    }

    #[test]
    fn test_validate_unknown_column() {
        let (columns, _) = records(&[]);
        let err = ReportFormatter::new(vec!["Region".into()], vec![])
            .validate(&columns)
            .unwrap_err();
        assert!(matches!(err, ReportError::UnknownColumn { role: "group", ref name } if name == "Region"));

        let err = ReportFormatter::new(vec!["Rep".into()], vec!["Price".into()])
            .validate(&columns)
            .unwrap_err();
        assert!(matches!(err, ReportError::UnknownColumn { role: "detail", .. }));
        assert!(formatter().validate(&columns).is_ok());
    }

    #[test]
    fn test_missing_column_projects_null() {
        let (columns, records) = records(&[("Bo", "Tower", "A-1", 2), ("Al", "Annex", "B-1", 1)]);
        let formatter = ReportFormatter::new(
            vec!["Region".into(), "Rep".into()],
            vec!["SKU".into(), "Price".into()],
        );
        let report = formatter.format(&columns, &records);

        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].key, vec![CellValue::Null, CellValue::from("Bo")]);
        assert_eq!(report.groups[1].rows, vec![vec![CellValue::from("B-1"), CellValue::Null]]);
        assert_eq!(report.group_columns, vec!["Region", "Rep"]);
    }

    #[test]
    fn test_no_records() {
        let (columns, _) = records(&[]);
        let report = formatter().format(&columns, &[]);
        assert!(report.groups.is_empty());
    }
}
