//! Estimated monthly savings from moving archival candidates to cold storage.

#![allow(missing_docs)]

use std::collections::HashSet;

use serde::Serialize;

use crate::core::config::RateConfig;
use crate::core::errors::Result;
use crate::inventory::record::BucketRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsRow {
    pub name: String,
    pub size_gb: f64,
    pub savings_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SavingsReport {
    pub rows: Vec<SavingsRow>,
    pub total_usd: f64,
}

/// `sizeGB × (standard − glacier)` for every record named in `candidates`.
///
/// Rows follow inventory order, not candidate order. A glacier rate above the
/// standard rate produces negative savings; that is reported as-is.
pub fn estimate_savings(
    records: &[BucketRecord],
    candidates: &[String],
    rates: &RateConfig,
) -> Result<SavingsReport> {
    let wanted: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let per_gb = rates.standard_usd_per_gb - rates.glacier_usd_per_gb;

    let mut report = SavingsReport::default();
    for (index, record) in records.iter().enumerate() {
        let name = record.require_name(index)?;
        if !wanted.contains(name) {
            continue;
        }
        let size_gb = record.require_size_gb(index)?;
        let savings_usd = size_gb * per_gb;
        report.total_usd += savings_usd;
        report.rows.push(SavingsRow {
            name: name.to_string(),
            size_gb,
            savings_usd,
        });
    }
    Ok(report)
}
