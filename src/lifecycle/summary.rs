//! Per-bucket summary projection.

#![allow(missing_docs)]

use serde::Serialize;

use crate::core::errors::Result;
use crate::inventory::record::{BucketRecord, Versioning};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub region: String,
    pub size_gb: f64,
    pub versioning: Versioning,
}

/// One row per record, in input order.
pub fn summarize(records: &[BucketRecord]) -> Result<Vec<SummaryRow>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Ok(SummaryRow {
                name: record.require_name(index)?.to_string(),
                region: record.require_region(index)?.to_string(),
                size_gb: record.require_size_gb(index)?,
                versioning: record.require_versioning(index)?.clone(),
            })
        })
        .collect()
}
