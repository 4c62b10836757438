//! Deletion queue vs. archival candidates.
//!
//! The decision is an ordered, first-match-wins rule:
//!
//! 1. larger than the deletion size AND staler than the deletion age → delete
//! 2. otherwise larger than the archival size → archive
//! 3. otherwise → retain
//!
//! A bucket that satisfies rule 1 is never also an archival candidate, even
//! though it necessarily exceeds the (smaller) archival size too.

#![allow(missing_docs)]

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::config::ThresholdConfig;
use crate::core::errors::Result;
use crate::inventory::record::BucketRecord;
use crate::lifecycle::staleness::stale_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Delete,
    Archive,
    Retain,
}

/// Thresholds of the deletion/archival rule. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationRules {
    pub deletion_size_gb: f64,
    pub deletion_stale_days: i64,
    pub archival_size_gb: f64,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::from_config(&ThresholdConfig::default())
    }
}

impl ClassificationRules {
    #[must_use]
    pub fn from_config(thresholds: &ThresholdConfig) -> Self {
        Self {
            deletion_size_gb: thresholds.deletion_size_gb,
            deletion_stale_days: thresholds.deletion_stale_days,
            archival_size_gb: thresholds.archival_size_gb,
        }
    }

    /// Apply the ordered rule to one bucket.
    #[must_use]
    pub fn decide(&self, size_gb: f64, stale_days: i64) -> LifecycleAction {
        if size_gb > self.deletion_size_gb && stale_days > self.deletion_stale_days {
            LifecycleAction::Delete
        } else if size_gb > self.archival_size_gb {
            LifecycleAction::Archive
        } else {
            LifecycleAction::Retain
        }
    }
}

/// Disjoint, input-ordered name lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub deletion_queue: Vec<String>,
    pub archival_candidates: Vec<String>,
}

/// Classify every record. Staleness is evaluated for every record, so a bad
/// date fails the pass even for buckets too small to qualify.
pub fn classify(
    records: &[BucketRecord],
    rules: &ClassificationRules,
    today: NaiveDate,
) -> Result<Classification> {
    let mut out = Classification::default();
    for (index, record) in records.iter().enumerate() {
        let size_gb = record.require_size_gb(index)?;
        let days = stale_days(record, index, today)?;
        match rules.decide(size_gb, days) {
            LifecycleAction::Delete => out
                .deletion_queue
                .push(record.require_name(index)?.to_string()),
            LifecycleAction::Archive => out
                .archival_candidates
                .push(record.require_name(index)?.to_string()),
            LifecycleAction::Retain => {}
        }
    }
    Ok(out)
}
