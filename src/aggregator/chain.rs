//! Fallback chain: resolves one carrier/region pair
//!
//! Sources are tried strictly one after another in configured priority
//! order. The first success ends the walk. When every source fails, the last
//! failure is the one reported, since later sources in a chain are usually
//! the slower but more authoritative ones.

use crate::config::{CarrierSpec, SourceDescriptor};
use crate::report::{CarrierRecord, SourceAttempt};
use crate::source::{AdapterRegistry, FailureKind, FetchOutcome};
use crate::state::ResolutionState;
use chrono::Utc;
use std::time::{Duration, Instant};

/// Walks a carrier's sources until one succeeds
#[derive(Debug, Clone)]
pub struct FallbackChain {
    registry: AdapterRegistry,
    default_timeout: Duration,
}

impl FallbackChain {
    /// Creates a chain over `registry`
    ///
    /// `default_timeout` bounds every adapter call whose source does not set
    /// its own `timeout-secs`.
    pub fn new(registry: AdapterRegistry, default_timeout: Duration) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Resolves `carrier` for `region` into a record
    ///
    /// Never fails: a carrier whose sources all fail still yields a record,
    /// carrying the last failure as its chosen outcome. Only attempted
    /// sources appear in the record's attempt list.
    pub async fn resolve(&self, carrier: &CarrierSpec, region: Option<&str>) -> CarrierRecord {
        let mut state = ResolutionState::Pending;
        let mut attempts: Vec<SourceAttempt> = Vec::with_capacity(carrier.sources.len());

        for (index, source) in carrier.sources.iter().enumerate() {
            let next = ResolutionState::Attempting(index);
            debug_assert!(state.can_transition_to(&next));
            tracing::trace!(carrier = %carrier.name, "{} -> {}", state, next);
            state = next;

            let outcome = self.attempt(&carrier.name, source, region).await;
            let succeeded = outcome.is_success();

            attempts.push(SourceAttempt {
                adapter: source.adapter_id().to_string(),
                address: source.address_for(region),
                outcome,
            });

            if succeeded {
                break;
            }
        }

        debug_assert!(state.can_transition_to(&ResolutionState::Resolved));
        tracing::trace!(carrier = %carrier.name, "{} -> resolved", state);

        let chosen = match attempts.last() {
            Some(last) => last.outcome.clone(),
            None => FetchOutcome::failure(
                FailureKind::Internal,
                format!("carrier '{}' has no sources configured", carrier.name),
            ),
        };

        if let FetchOutcome::Failure { kind, message } = &chosen {
            tracing::warn!(
                carrier = %carrier.name,
                region = region.unwrap_or("none"),
                "All {} source(s) failed, reporting {}: {}",
                attempts.len(),
                kind,
                message
            );
        }

        CarrierRecord {
            carrier: carrier.name.clone(),
            region: region.map(str::to_string),
            captured_at: Utc::now(),
            chosen,
            attempts,
        }
    }

    /// Invokes one source's adapter under its timeout
    async fn attempt(
        &self,
        carrier: &str,
        source: &SourceDescriptor,
        region: Option<&str>,
    ) -> FetchOutcome {
        let adapter_id = source.adapter_id();
        let adapter = match self.registry.get(adapter_id) {
            Some(adapter) => adapter,
            None => {
                return FetchOutcome::failure(
                    FailureKind::Internal,
                    format!("no adapter registered as '{}'", adapter_id),
                )
            }
        };

        let timeout = source
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let started = Instant::now();
        let outcome = match tokio::time::timeout(timeout, adapter.fetch(source, region)).await {
            Ok(outcome) => outcome,
            Err(_) => FetchOutcome::failure(
                FailureKind::Timeout,
                format!("No response within {} ms", timeout.as_millis()),
            ),
        };

        tracing::debug!(
            carrier,
            adapter = adapter.name(),
            address = %source.address_for(region),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "source {}",
            match outcome.failure_kind() {
                None => "succeeded".to_string(),
                Some(kind) => format!("failed ({})", kind),
            }
        );

        outcome
    }
}
