//! Source adapter trait and fetch outcome types
//!
//! Every source, whatever its response shape, reports back through
//! [`FetchOutcome`]. Adapters never return errors: transport problems,
//! bad status codes and missing page structure all become typed failures.

use crate::config::SourceDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a source failed to produce a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The per-call time bound was exceeded
    Timeout,

    /// A response arrived with a non-success status code
    HttpError,

    /// A successful response lacked the expected structure
    ParseError,

    /// Network-level failure (DNS, connection refused, TLS)
    Unreachable,

    /// The resolution itself failed (panicked task, unregistered adapter,
    /// carrier without sources)
    Internal,
}

impl FailureKind {
    /// All kinds, in display order
    pub const ALL: [FailureKind; 5] = [
        Self::Timeout,
        Self::HttpError,
        Self::ParseError,
        Self::Unreachable,
        Self::Internal,
    ];

    /// Short label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::HttpError => "http_error",
            Self::ParseError => "parse_error",
            Self::Unreachable => "unreachable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of invoking one adapter against one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success {
        /// Human-readable status text
        summary: String,
        /// Source-specific structured payload
        detail: serde_json::Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl FetchOutcome {
    pub fn success(summary: impl Into<String>, detail: serde_json::Value) -> Self {
        Self::Success {
            summary: summary.into(),
            detail,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// A parse failure carrying the "no data found" summary
    pub fn no_data(reason: impl fmt::Display) -> Self {
        Self::failure(FailureKind::ParseError, format!("No data found: {}", reason))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure kind, if this is a failure
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Summary text for successes, message for failures
    pub fn text(&self) -> &str {
        match self {
            Self::Success { summary, .. } => summary,
            Self::Failure { message, .. } => message,
        }
    }
}

/// Fetches and normalizes one kind of status source
///
/// Implementations must be cheap to share between tasks. The caller bounds
/// each call with a timeout, so an adapter may simply await its request.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetches `source` for the given region and normalizes the response
    async fn fetch(&self, source: &SourceDescriptor, region: Option<&str>) -> FetchOutcome;

    /// Adapter name for logs
    fn name(&self) -> &'static str;
}
