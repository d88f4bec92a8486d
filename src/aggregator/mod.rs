//! Aggregation module: fallback chains and the engine that drives them
//!
//! This module contains the core status-collection logic, including:
//! - Trying a carrier's sources in priority order (first success wins)
//! - Bounding each source call with its own timeout
//! - Fanning out over carriers and regions under a concurrency limit
//! - Assembling one record per carrier/region pair into a report

mod chain;
mod engine;

pub use chain::FallbackChain;
pub use engine::{plan_run, Engine, PlannedResolution};

use crate::config::Config;
use crate::report::Report;
use crate::WatchError;

/// Runs one aggregation pass over the configured carriers
///
/// Builds the HTTP client and built-in adapters from `config`, then resolves
/// every carrier for `regions`. Only client construction can fail; source
/// failures end up inside the report.
///
/// # Example
///
/// ```no_run
/// use outage_watch::aggregator::aggregate;
/// use outage_watch::config::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("outage-watch.toml"))?;
/// let report = aggregate(&config, &["10001".to_string()]).await?;
/// println!("{} records", report.len());
/// # Ok(())
/// # }
/// ```
pub async fn aggregate(config: &Config, regions: &[String]) -> Result<Report, WatchError> {
    let engine = Engine::from_config(config)?;
    Ok(engine.run(&config.carriers, regions).await)
}
