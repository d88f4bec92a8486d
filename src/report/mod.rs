//! Report schema shared by the aggregation engine and the report sinks
//!
//! A [`Report`] holds exactly one [`CarrierRecord`] per tracked
//! carrier/region pair, in configuration order. Records are assembled once
//! by the fallback chain and never modified afterwards.

use crate::source::{FailureKind, FetchOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label used for records that carry no region
pub const NO_REGION: &str = "none";

/// One attempted source within a fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttempt {
    /// Adapter identifier that handled the source
    pub adapter: String,

    /// Rendered address that was requested
    pub address: String,

    pub outcome: FetchOutcome,
}

/// Per-carrier, per-region unit of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierRecord {
    pub carrier: String,

    #[serde(with = "region_label")]
    pub region: Option<String>,

    /// Capture instant
    pub captured_at: DateTime<Utc>,

    /// First success in priority order, or the last failure
    pub chosen: FetchOutcome,

    /// Every attempted source, in the order tried
    pub attempts: Vec<SourceAttempt>,
}

impl CarrierRecord {
    pub fn is_success(&self) -> bool {
        self.chosen.is_success()
    }

    /// Region identifier, or `"none"`
    pub fn region_label(&self) -> &str {
        self.region.as_deref().unwrap_or(NO_REGION)
    }

    /// Text renderers should show: the summary, or the failure reason
    pub fn summary_text(&self) -> &str {
        self.chosen.text()
    }

    /// Address of the source whose outcome was chosen
    pub fn chosen_address(&self) -> Option<&str> {
        self.attempts.last().map(|a| a.address.as_str())
    }

    /// Compares two records ignoring their capture instants
    pub fn same_content(&self, other: &CarrierRecord) -> bool {
        self.carrier == other.carrier
            && self.region == other.region
            && self.chosen == other.chosen
            && self.attempts == other.attempts
    }
}

/// The complete result of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// When the run finished assembling the report
    pub generated_at: DateTime<Utc>,

    /// Hash of the configuration that produced the report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    pub records: Vec<CarrierRecord>,
}

impl Report {
    pub fn new(records: Vec<CarrierRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            config_hash: None,
            records,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CarrierRecord> {
        self.records.iter()
    }

    /// Records whose chosen outcome is a success
    pub fn successes(&self) -> impl Iterator<Item = &CarrierRecord> {
        self.records.iter().filter(|r| r.is_success())
    }

    /// Records where every source failed
    pub fn failures(&self) -> impl Iterator<Item = &CarrierRecord> {
        self.records.iter().filter(|r| !r.is_success())
    }

    /// Finds the record for a carrier/region pair
    pub fn find(&self, carrier: &str, region: Option<&str>) -> Option<&CarrierRecord> {
        self.records
            .iter()
            .find(|r| r.carrier == carrier && r.region.as_deref() == region)
    }

    /// Count of failed records per chosen failure kind
    pub fn failure_counts(&self) -> BTreeMap<FailureKind, usize> {
        let mut counts = BTreeMap::new();
        for kind in self.records.iter().filter_map(|r| r.chosen.failure_kind()) {
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Serializes `Option<String>` regions as a plain string with `"none"` for
/// the absent case
mod region_label {
    use super::NO_REGION;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(region: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(region.as_deref().unwrap_or(NO_REGION))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let label = String::deserialize(d)?;
        Ok(if label == NO_REGION { None } else { Some(label) })
    }
}
