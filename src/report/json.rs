//! JSON output format

use std::io::Write;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::CellValue;

use super::{Report, ReportRenderer, ReportSection};

/// JSON output formatter (pretty-printed)
#[derive(Debug, Default)]
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    key: IndexMap<&'a str, &'a CellValue>,
    rows: Vec<IndexMap<&'a str, &'a CellValue>>,
}

fn report_to_json(report: &Report) -> Vec<JsonGroup<'_>> {
    report
        .groups
        .iter()
        .map(|group| JsonGroup {
            key: report
                .group_columns
                .iter()
                .map(String::as_str)
                .zip(&group.key)
                .collect(),
            rows: group
                .rows
                .iter()
                .map(|row| {
                    report
                        .detail_columns
                        .iter()
                        .map(String::as_str)
                        .zip(row)
                        .collect()
                })
                .collect(),
        })
        .collect()
}

impl ReportRenderer for JsonOutput {
    /// Writes one object keyed by section label (`"Added"`, `"Removed"`).
    /// Sections without records are absent, so no differences renders `{}`.
    fn render(&self, sections: &[ReportSection], writer: &mut dyn Write) -> Result<()> {
        let output: IndexMap<&str, Vec<JsonGroup<'_>>> = sections
            .iter()
            .map(|s| (s.label.as_str(), report_to_json(&s.report)))
            .collect();

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;

        Ok(())
    }
}
