//! Plain text terminal output

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Ansi, Color, ColorSpec, NoColor, WriteColor};

use super::{Report, ReportRenderer, ReportSection};

const RULE: &str = "────────────────────────────────────────";

/// Terminal output, optionally with colored section headings
pub struct TerminalOutput {
    color: bool,
}

impl TerminalOutput {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn write_section<W: WriteColor + ?Sized>(&self, out: &mut W, section: &ReportSection) -> Result<()> {
        let color = match section.label.as_str() {
            crate::diff::ADDED => Color::Green,
            crate::diff::REMOVED => Color::Red,
            _ => Color::Cyan,
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{}", section.label)?;
        out.reset()?;
        writeln!(
            out,
            " ({} rows in {} groups)",
            section.report.row_count(),
            section.report.groups.len()
        )?;
        writeln!(out)?;

        write_report(out, &section.report)
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ReportRenderer for TerminalOutput {
    fn render(&self, sections: &[ReportSection], writer: &mut dyn Write) -> Result<()> {
        let mut out: Box<dyn WriteColor + '_> = if self.color {
            Box::new(Ansi::new(writer))
        } else {
            Box::new(NoColor::new(writer))
        };

        if sections.is_empty() {
            writeln!(out, "No differences found.")?;
            return Ok(());
        }

        for section in sections {
            self.write_section(out.as_mut(), section)?;
        }

        Ok(())
    }
}

fn write_report<W: WriteColor + ?Sized>(out: &mut W, report: &Report) -> Result<()> {
    for group in &report.groups {
        writeln!(out, "{}", RULE)?;
        for (name, value) in report.group_columns.iter().zip(&group.key) {
            writeln!(out, "{}: {}", name, value.display())?;
        }

        let mut builder = Builder::default();
        builder.push_record(report.detail_columns.iter().cloned());
        for row in &group.rows {
            builder.push_record(row.iter().map(|c| c.display().into_owned()));
        }
        let mut table = builder.build();
        table.with(Style::modern());
        writeln!(out, "{}", table)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use crate::report::ProjectGroup;

    fn render(sections: &[ReportSection]) -> String {
        let mut out = Vec::new();
        TerminalOutput::new(false).render(sections, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_groups_rendered_once_each() {
        let section = ReportSection {
            label: "Added".into(),
            report: Report {
                group_columns: vec!["Project".into()],
                detail_columns: vec!["SKU".into(), "Qty".into()],
                groups: vec![
                    ProjectGroup {
                        key: vec!["Tower".into()],
                        rows: vec![
                            vec!["A-1".into(), CellValue::Int(2)],
                            vec!["A-2".into(), CellValue::Int(5)],
                        ],
                    },
                    ProjectGroup {
                        key: vec!["Annex".into()],
                        rows: vec![vec!["B-1".into(), CellValue::Int(1)]],
                    },
                ],
            },
        };
        let text = render(&[section]);

        assert!(text.starts_with("Added (3 rows in 2 groups)"));
        assert_eq!(text.matches("Project: Tower").count(), 1);
        assert!(text.find("Project: Tower").unwrap() < text.find("Project: Annex").unwrap());
        assert!(text.contains("A-2"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_no_sections() {
        assert_eq!(render(&[]), "No differences found.\n");
    }

    #[test]
    fn test_color_codes_when_enabled() {
        let section = ReportSection {
            label: "Removed".into(),
            report: Report {
                group_columns: vec![],
                detail_columns: vec![],
                groups: vec![],
            },
        };
        let mut out = Vec::new();
        TerminalOutput::new(true).render(&[section], &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains('\u{1b}'));
    }
}
