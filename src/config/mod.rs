//! Configuration module for Outage Watch
//!
//! This module handles loading, parsing, and validating the TOML file that
//! describes the tracked carriers and their prioritized status sources.
//!
//! # Example
//!
//! ```no_run
//! use outage_watch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("outage-watch.toml")).unwrap();
//! println!("Tracking {} carriers", config.carriers.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CarrierSpec, Config, EngineConfig, OutputConfig, SourceDescriptor, SourceKind,
    UserAgentConfig, REGION_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_text, load_config, load_config_with_hash, parse_config,
};
pub use validation::{validate_region, BUILTIN_ADAPTERS};
