//! Full lifecycle report: every view from one inventory and one "today".

#![allow(missing_docs)]

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::config::{Config, RateConfig};
use crate::core::errors::Result;
use crate::inventory::loader::ensure_unique_names;
use crate::inventory::record::BucketRecord;
use crate::lifecycle::classify::{Classification, ClassificationRules, classify};
use crate::lifecycle::cost::{CostReport, aggregate_costs};
use crate::lifecycle::savings::{SavingsReport, estimate_savings};
use crate::lifecycle::summary::{SummaryRow, summarize};
use crate::lifecycle::unused::{UnusedBucket, UnusedCriteria, find_unused};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleReport {
    /// Reference date every staleness figure was computed against.
    pub as_of: NaiveDate,
    pub summary: Vec<SummaryRow>,
    pub unused: Vec<UnusedBucket>,
    pub costs: CostReport,
    pub classification: Classification,
    pub savings: SavingsReport,
}

impl LifecycleReport {
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.summary.len()
    }
}

/// Deterministic evaluator. Holds only parameters; the clock is passed per call.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEngine {
    pub unused: UnusedCriteria,
    pub rules: ClassificationRules,
    pub rates: RateConfig,
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl LifecycleEngine {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            unused: UnusedCriteria::from_config(&config.thresholds),
            rules: ClassificationRules::from_config(&config.thresholds),
            rates: config.rates.clone(),
        }
    }

    pub fn summary(&self, records: &[BucketRecord]) -> Result<Vec<SummaryRow>> {
        summarize(records)
    }

    pub fn unused(&self, records: &[BucketRecord], today: NaiveDate) -> Result<Vec<UnusedBucket>> {
        find_unused(records, &self.unused, today)
    }

    pub fn costs(&self, records: &[BucketRecord]) -> Result<CostReport> {
        aggregate_costs(records, self.rates.standard_usd_per_gb)
    }

    /// Deletion queue and archival candidates. Names must be unique since
    /// both lists identify buckets by name.
    pub fn classify(&self, records: &[BucketRecord], today: NaiveDate) -> Result<Classification> {
        ensure_unique_names(records)?;
        classify(records, &self.rules, today)
    }

    /// Savings over the archival candidates of `classification`.
    pub fn savings(
        &self,
        records: &[BucketRecord],
        classification: &Classification,
    ) -> Result<SavingsReport> {
        ensure_unique_names(records)?;
        estimate_savings(records, &classification.archival_candidates, &self.rates)
    }

    /// Compute all views. Any record error aborts the whole report.
    pub fn evaluate(&self, records: &[BucketRecord], today: NaiveDate) -> Result<LifecycleReport> {
        ensure_unique_names(records)?;
        let summary = self.summary(records)?;
        let unused = self.unused(records, today)?;
        let costs = self.costs(records)?;
        let classification = classify(records, &self.rules, today)?;
        let savings =
            estimate_savings(records, &classification.archival_candidates, &self.rates)?;
        Ok(LifecycleReport {
            as_of: today,
            summary,
            unused,
            costs,
            classification,
            savings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SlhError;
    use crate::lifecycle::staleness::DATE_FORMAT;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).unwrap()
    }

    #[test]
    fn large_stale_bucket_goes_to_deletion_only() {
        let records = vec![
            BucketRecord::new("a", "us-east", 120.0, "2023-01-01")
                .with_last_accessed("2024-01-01")
                .with_team("infra"),
        ];
        let report = LifecycleEngine::default()
            .evaluate(&records, day("2024-02-01"))
            .unwrap();

        assert_eq!(report.classification.deletion_queue, ["a"]);
        assert!(report.classification.archival_candidates.is_empty());
        assert!(report.savings.rows.is_empty());
        assert!((report.costs.by_region.get("us-east").unwrap() - 2.76).abs() < 1e-9);
        // 31 days is below the 90 day unused threshold
        assert!(report.unused.is_empty());
        assert_eq!(report.bucket_count(), 1);
    }

    #[test]
    fn custom_thresholds_flow_from_config() {
        let mut config = Config::default();
        config.thresholds.archival_size_gb = 5.0;
        config.rates.glacier_usd_per_gb = 0.0;
        let engine = LifecycleEngine::from_config(&config);

        let records = vec![
            BucketRecord::new("small", "us-east", 10.0, "2024-01-30").with_team("web"),
        ];
        let report = engine.evaluate(&records, day("2024-02-01")).unwrap();
        assert_eq!(report.classification.archival_candidates, ["small"]);
        assert!((report.savings.total_usd - 0.23).abs() < 1e-9);
    }

    #[test]
    fn duplicate_names_abort_evaluation() {
        let records = vec![
            BucketRecord::new("a", "us-east", 1.0, "2024-01-01").with_team("web"),
            BucketRecord::new("a", "us-east", 1.0, "2024-01-01").with_team("web"),
        ];
        assert!(matches!(
            LifecycleEngine::default().evaluate(&records, day("2024-02-01")),
            Err(SlhError::DuplicateBucket { .. })
        ));
    }

    #[test]
    fn single_views_reject_duplicate_names() {
        let records = vec![
            BucketRecord::new("a", "us-east", 60.0, "2024-01-01").with_team("web"),
            BucketRecord::new("a", "us-east", 10.0, "2024-01-01").with_team("web"),
        ];
        let engine = LifecycleEngine::default();
        assert!(matches!(
            engine.classify(&records, day("2024-02-01")),
            Err(SlhError::DuplicateBucket { first: 0, second: 1, .. })
        ));

        let classification = Classification {
            deletion_queue: Vec::new(),
            archival_candidates: vec!["a".to_string()],
        };
        assert!(matches!(
            engine.savings(&records, &classification),
            Err(SlhError::DuplicateBucket { .. })
        ));
    }

    #[test]
    fn report_serializes_with_iso_date() {
        let report = LifecycleEngine::default()
            .evaluate(&[], day("2024-02-01"))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["as_of"], "2024-02-01");
        assert_eq!(json["savings"]["total_usd"], 0.0);
    }
}
