//! Outage Watch: a resilient carrier status aggregator
//!
//! This crate polls several independent status sources (official APIs, HTML
//! status pages, third-party mirrors) for a configured set of
//! telecommunications carriers and folds them into one uniform report.

pub mod aggregator;
pub mod config;
pub mod output;
pub mod report;
pub mod source;
pub mod state;

use thiserror::Error;

/// Main error type for Outage Watch operations
///
/// Source-level failures never show up here: they are carried inside the
/// report as [`source::FetchOutcome::Failure`] values.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Run cancelled before completion")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Outage Watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use aggregator::{Engine, FallbackChain};
pub use config::{CarrierSpec, Config, SourceDescriptor, SourceKind};
pub use report::{CarrierRecord, Report, SourceAttempt};
pub use source::{AdapterRegistry, FailureKind, FetchOutcome, SourceAdapter};
pub use state::ResolutionState;
