//! Unused-and-oversized bucket report.
//!
//! Independent of the deletion/archival rule: its own size and staleness
//! thresholds, never merged with the classifier's.

#![allow(missing_docs)]

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::config::ThresholdConfig;
use crate::core::errors::Result;
use crate::inventory::record::BucketRecord;
use crate::lifecycle::staleness::stale_days;

/// Strict lower bounds for the unused report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnusedCriteria {
    pub size_gb: f64,
    pub stale_days: i64,
}

impl Default for UnusedCriteria {
    fn default() -> Self {
        Self::from_config(&ThresholdConfig::default())
    }
}

impl UnusedCriteria {
    #[must_use]
    pub fn from_config(thresholds: &ThresholdConfig) -> Self {
        Self {
            size_gb: thresholds.unused_size_gb,
            stale_days: thresholds.unused_stale_days,
        }
    }

    #[must_use]
    pub fn matches(&self, size_gb: f64, stale_days: i64) -> bool {
        size_gb > self.size_gb && stale_days > self.stale_days
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedBucket {
    pub name: String,
    pub size_gb: f64,
    pub stale_days: i64,
}

/// Buckets above both thresholds, in input order.
pub fn find_unused(
    records: &[BucketRecord],
    criteria: &UnusedCriteria,
    today: NaiveDate,
) -> Result<Vec<UnusedBucket>> {
    let mut unused = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let size_gb = record.require_size_gb(index)?;
        let days = stale_days(record, index, today)?;
        if criteria.matches(size_gb, days) {
            unused.push(UnusedBucket {
                name: record.require_name(index)?.to_string(),
                size_gb,
                stale_days: days,
            });
        }
    }
    Ok(unused)
}
