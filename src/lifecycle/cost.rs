//! Projected monthly cost rollups by region and by team.

#![allow(missing_docs)]

use std::collections::HashMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::core::errors::Result;
use crate::inventory::record::BucketRecord;

/// Cost totals keyed by a grouping label, in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostRollup {
    entries: Vec<(String, f64)>,
    positions: HashMap<String, usize>,
}

impl CostRollup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `cost` to `key`, creating the key at the end if unseen.
    pub fn accrue(&mut self, key: &str, cost: f64) {
        if let Some(&pos) = self.positions.get(key) {
            self.entries[pos].1 += cost;
        } else {
            self.positions.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), cost));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.positions.get(key).map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, cost)| (key.as_str(), *cost))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, cost)| cost).sum()
    }
}

// Serialized as a JSON object whose keys keep first-seen order.
impl Serialize for CostRollup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, cost) in &self.entries {
            map.serialize_entry(key, cost)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostReport {
    pub by_region: CostRollup,
    pub by_team: CostRollup,
}

impl CostReport {
    /// Total over all buckets (equal for either grouping).
    #[must_use]
    pub fn total(&self) -> f64 {
        self.by_region.total()
    }
}

/// Sum `sizeGB × standard_rate` per region and per team.
///
/// A record without a team tag aborts the rollup rather than being skipped,
/// since skipping would silently understate the totals.
pub fn aggregate_costs(records: &[BucketRecord], standard_rate: f64) -> Result<CostReport> {
    let mut report = CostReport::default();
    for (index, record) in records.iter().enumerate() {
        let size_gb = record.require_size_gb(index)?;
        let region = record.require_region(index)?;
        let team = record.require_team(index)?;

        let cost = size_gb * standard_rate;
        report.by_region.accrue(region, cost);
        report.by_team.accrue(team, cost);
    }
    Ok(report)
}
