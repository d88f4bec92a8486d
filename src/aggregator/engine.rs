//! Aggregation engine - drives the fallback chain for every carrier/region
//!
//! This module handles:
//! - Expanding the carrier table into carrier/region pairs
//! - Running resolutions in parallel under a global concurrency limit
//! - Isolating panicking resolutions into failure records
//! - Assembling records into a report in configuration order
//! - Abandoning a run on shutdown without emitting a partial report

use crate::aggregator::chain::FallbackChain;
use crate::config::{CarrierSpec, Config};
use crate::report::{CarrierRecord, Report};
use crate::source::{build_http_client, AdapterRegistry, FailureKind, FetchOutcome};
use crate::WatchError;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// One carrier/region pair to resolve in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedResolution {
    /// Index into the carrier table
    pub carrier_index: usize,

    pub carrier: String,

    pub region: Option<String>,
}

/// Expands a carrier table into the ordered list of pairs to resolve
///
/// Carriers keep configuration order; regions within a carrier keep the
/// order they were given in.
pub fn plan_run(carriers: &[CarrierSpec], regions: &[String]) -> Vec<PlannedResolution> {
    carriers
        .iter()
        .enumerate()
        .flat_map(|(carrier_index, carrier)| {
            carrier
                .regions_for_run(regions)
                .into_iter()
                .map(move |region| PlannedResolution {
                    carrier_index,
                    carrier: carrier.name.clone(),
                    region,
                })
        })
        .collect()
}

/// Main aggregation engine
///
/// Holds no state between runs beyond the chain's adapter registry.
#[derive(Debug, Clone)]
pub struct Engine {
    chain: Arc<FallbackChain>,
    concurrency: usize,
}

impl Engine {
    /// Creates an engine over `chain` running at most `concurrency`
    /// resolutions at once
    pub fn new(chain: FallbackChain, concurrency: usize) -> Self {
        Self {
            chain: Arc::new(chain),
            concurrency: concurrency.max(1),
        }
    }

    /// Builds an engine with the built-in adapters from the configuration
    pub fn from_config(config: &Config) -> Result<Self, WatchError> {
        let client = build_http_client(&config.user_agent)?;
        let registry = AdapterRegistry::with_builtins(client);
        let chain = FallbackChain::new(registry, Duration::from_secs(config.engine.timeout_secs));
        Ok(Self::new(chain, config.engine.concurrency as usize))
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every carrier/region resolution and assembles the report
    ///
    /// Always returns a complete report: one record per planned pair.
    pub async fn run(&self, carriers: &[CarrierSpec], regions: &[String]) -> Report {
        self.spawn_run(carriers, regions).collect().await
    }

    /// Like [`Engine::run`], but abandons the run when `shutdown` completes
    /// first
    ///
    /// On shutdown every in-flight resolution is aborted and
    /// `WatchError::Cancelled` is returned; no partial report escapes.
    pub async fn run_until<F>(
        &self,
        carriers: &[CarrierSpec],
        regions: &[String],
        shutdown: F,
    ) -> Result<Report, WatchError>
    where
        F: Future<Output = ()>,
    {
        let mut run = self.spawn_run(carriers, regions);

        tokio::select! {
            report = run.collect() => Ok(report),
            _ = shutdown => {
                tracing::warn!("Shutdown requested, abandoning run");
                Err(WatchError::Cancelled)
            }
        }
    }

    /// Spawns one task per planned pair, gated by the concurrency semaphore
    fn spawn_run(&self, carriers: &[CarrierSpec], regions: &[String]) -> RunningTasks {
        let plan = plan_run(carriers, regions);
        let table: Vec<Arc<CarrierSpec>> = carriers.iter().cloned().map(Arc::new).collect();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        tracing::info!(
            "Starting run: {} carrier(s), {} resolution(s), concurrency {}",
            carriers.len(),
            plan.len(),
            self.concurrency
        );

        let tasks = plan
            .into_iter()
            .map(|planned| {
                let chain = Arc::clone(&self.chain);
                let carrier = Arc::clone(&table[planned.carrier_index]);
                let semaphore = Arc::clone(&semaphore);
                let region = planned.region.clone();

                let handle = tokio::spawn(async move {
                    // The semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    chain.resolve(&carrier, region.as_deref()).await
                });

                (planned, handle)
            })
            .collect();

        RunningTasks {
            tasks,
            started: Instant::now(),
        }
    }
}

/// Spawned resolutions of one run, in plan order
///
/// Dropping it aborts whatever is still running.
struct RunningTasks {
    tasks: Vec<(PlannedResolution, JoinHandle<CarrierRecord>)>,
    started: Instant,
}

impl RunningTasks {
    /// Awaits every resolution in plan order and assembles the report
    async fn collect(&mut self) -> Report {
        let mut records = Vec::with_capacity(self.tasks.len());

        for (planned, handle) in self.tasks.iter_mut() {
            let record = match handle.await {
                Ok(record) => record,
                Err(e) => failed_resolution(planned, e),
            };
            records.push(record);
        }

        let report = Report::new(records);
        tracing::info!(
            "Run completed in {:?}: {} record(s), {} ok, {} failed",
            self.started.elapsed(),
            report.len(),
            report.successes().count(),
            report.failures().count()
        );
        report
    }
}

impl Drop for RunningTasks {
    fn drop(&mut self) {
        for (_, handle) in &self.tasks {
            handle.abort();
        }
    }
}

/// Turns a crashed resolution task into a failure record for its pair
fn failed_resolution(planned: &PlannedResolution, error: JoinError) -> CarrierRecord {
    let message = if error.is_panic() {
        let payload = error.into_panic();
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        format!("Resolution panicked: {}", reason)
    } else {
        "Resolution task was cancelled".to_string()
    };

    tracing::warn!(
        carrier = %planned.carrier,
        region = planned.region.as_deref().unwrap_or("none"),
        "{}",
        message
    );

    CarrierRecord {
        carrier: planned.carrier.clone(),
        region: planned.region.clone(),
        captured_at: Utc::now(),
        chosen: FetchOutcome::failure(FailureKind::Internal, message),
        attempts: Vec::new(),
    }
}
