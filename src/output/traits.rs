//! Report sink trait and error types
//!
//! Sinks consume a finished [`Report`]. The engine knows nothing about the
//! formats they write.

use crate::report::Report;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report sinks
///
/// A sink receives the whole report once per run.
pub trait ReportSink {
    /// Persists or renders the report
    fn write_report(&self, report: &Report) -> OutputResult<()>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Writes a report to every sink in order, stopping at the first error
pub fn write_all(sinks: &[Box<dyn ReportSink>], report: &Report) -> OutputResult<()> {
    for sink in sinks {
        sink.write_report(report)?;
        tracing::debug!("Report written by {} sink", sink.name());
    }
    Ok(())
}
