//! HTML report rendering
//!
//! Produces a single self-contained page with one table row per record.

use crate::output::traits::{OutputResult, ReportSink};
use crate::report::{CarrierRecord, Report};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes reports as an HTML table
#[derive(Debug, Clone)]
pub struct HtmlReportSink {
    path: PathBuf,
}

impl HtmlReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for HtmlReportSink {
    fn write_report(&self, report: &Report) -> OutputResult<()> {
        let html = format_html_report(report);
        let mut file = File::create(&self.path)?;
        file.write_all(html.as_bytes())?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

/// Formats a report as an HTML page
pub fn format_html_report(report: &Report) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html><head><meta charset=\"utf-8\"><title>US Outage Report</title></head><body>\n");
    html.push_str(&format!(
        "<h1>US Outage Report \u{2013} {}</h1>\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p>{} carrier record(s): {} reporting, {} with all sources failing.</p>\n",
        report.len(),
        report.successes().count(),
        report.failures().count()
    ));

    html.push_str("<table border='1' cellpadding='5' cellspacing='0'>\n");
    html.push_str(
        "<tr><th>Carrier</th><th>Region</th><th>Status</th><th>Summary</th><th>Link</th><th>Time</th></tr>\n",
    );

    for record in &report.records {
        html.push_str(&format_row(record));
    }

    html.push_str("</table>\n</body></html>\n");
    html
}

fn format_row(record: &CarrierRecord) -> String {
    let status = match record.chosen.failure_kind() {
        None => "ok".to_string(),
        Some(kind) => format!("failed ({})", kind),
    };

    let link = match record.chosen_address() {
        Some(address) => format!(
            "<a href=\"{}\">Status Page</a>",
            encode_double_quoted_attribute(address)
        ),
        None => "N/A".to_string(),
    };

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        encode_text(&record.carrier),
        encode_text(record.region_label()),
        status,
        encode_text(record.summary_text()),
        link,
        record.captured_at.to_rfc3339()
    )
}
