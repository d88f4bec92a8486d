//! Report statistics
//!
//! This module summarizes a report into counts for the terminal.

use crate::report::Report;
use crate::source::FailureKind;
use std::collections::BTreeMap;

/// Outcome counts for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStatistics {
    /// Number of carrier/region records
    pub total_records: usize,

    /// Distinct carriers in the report
    pub carriers: usize,

    /// Records whose chosen outcome is a success
    pub successes: usize,

    /// Chosen failures by kind
    pub failures_by_kind: BTreeMap<FailureKind, usize>,

    /// Source attempts made across all records
    pub total_attempts: usize,

    /// Records that needed more than one source
    pub fallbacks_used: usize,
}

impl ReportStatistics {
    pub fn failures(&self) -> usize {
        self.failures_by_kind.values().sum()
    }

    /// Share of records with a successful outcome, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.successes as f64 / self.total_records as f64) * 100.0
    }
}

/// Computes statistics for a report
pub fn compute_statistics(report: &Report) -> ReportStatistics {
    let mut carriers: Vec<&str> = report.iter().map(|r| r.carrier.as_str()).collect();
    carriers.sort_unstable();
    carriers.dedup();

    ReportStatistics {
        total_records: report.len(),
        carriers: carriers.len(),
        successes: report.successes().count(),
        failures_by_kind: report.failure_counts(),
        total_attempts: report.iter().map(|r| r.attempts.len()).sum(),
        fallbacks_used: report.iter().filter(|r| r.attempts.len() > 1).count(),
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ReportStatistics) {
    println!("=== Outage Report Statistics ===\n");

    println!("Overview:");
    println!("  Carriers: {}", stats.carriers);
    println!("  Records: {}", stats.total_records);
    println!("  Source attempts: {}", stats.total_attempts);
    println!("  Records needing a fallback source: {}", stats.fallbacks_used);
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failures by Kind:");
        for kind in FailureKind::ALL {
            if let Some(count) = stats.failures_by_kind.get(&kind) {
                println!("  {}: {}", kind, count);
            }
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} records reporting)",
        stats.success_rate(),
        stats.successes,
        stats.total_records
    );
}
