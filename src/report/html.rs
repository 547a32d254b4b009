//! HTML fragment output, suitable for embedding in an email body

use std::io::Write;

use anyhow::Result;

use super::{Report, ReportRenderer, ReportSection};

/// HTML report output
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for HtmlOutput {
    fn render(&self, sections: &[ReportSection], writer: &mut dyn Write) -> Result<()> {
        if sections.is_empty() {
            writeln!(writer, "<p>No differences found.</p>")?;
            return Ok(());
        }

        for section in sections {
            writeln!(writer, "<h2>{}</h2>", html_escape(&section.label))?;
            write_report(writer, &section.report)?;
        }

        Ok(())
    }
}

fn write_report(writer: &mut dyn Write, report: &Report) -> Result<()> {
    for group in &report.groups {
        writeln!(writer, "<hr>")?;
        for (name, value) in report.group_columns.iter().zip(&group.key) {
            writeln!(
                writer,
                "<h3>{}: <span style=\"font-weight: lighter\">{}</span></h3>",
                html_escape(name),
                html_escape(value.display())
            )?;
        }

        // Header
        writeln!(writer, "<table border=\"1\">")?;
        writeln!(writer, "  <thead>")?;
        writeln!(writer, "    <tr>")?;
        for col in &report.detail_columns {
            writeln!(writer, "      <th>{}</th>", html_escape(col))?;
        }
        writeln!(writer, "    </tr>")?;
        writeln!(writer, "  </thead>")?;

        // Rows
        writeln!(writer, "  <tbody>")?;
        for row in &group.rows {
            writeln!(writer, "    <tr>")?;
            for cell in row {
                writeln!(writer, "      <td>{}</td>", html_escape(cell.display()))?;
            }
            writeln!(writer, "    </tr>")?;
        }
        writeln!(writer, "  </tbody>")?;
        writeln!(writer, "</table>")?;
        writeln!(writer, "<br>")?;
    }
    Ok(())
}

fn html_escape(s: impl AsRef<str>) -> String {
    s.as_ref()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
