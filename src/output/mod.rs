//! Output module: report sinks
//!
//! This module handles:
//! - Writing the report as JSON
//! - Rendering the report as an HTML table
//! - Summarizing outcome statistics for the terminal

mod html;
mod json;
pub mod stats;
mod traits;

pub use html::{format_html_report, HtmlReportSink};
pub use json::JsonReportSink;
pub use stats::{compute_statistics, print_statistics, ReportStatistics};
pub use traits::{write_all, OutputError, OutputResult, ReportSink};
