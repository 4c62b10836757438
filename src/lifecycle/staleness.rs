//! Staleness: whole days since a bucket was last touched.

use chrono::NaiveDate;

use crate::core::errors::{Result, SlhError};
use crate::inventory::record::BucketRecord;

/// Date format used by inventory documents.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an inventory date, attributing failures to the record and field.
pub fn parse_record_date(
    record: &BucketRecord,
    index: usize,
    field: &'static str,
    raw: &str,
) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| SlhError::InvalidDate {
        bucket: record.bucket_ref(index),
        field,
        raw: raw.to_string(),
    })
}

/// The date staleness is measured from: `lastAccessed`, else `createdOn`.
pub fn staleness_anchor(record: &BucketRecord, index: usize) -> Result<NaiveDate> {
    match record.last_accessed.as_deref() {
        Some(raw) => parse_record_date(record, index, "lastAccessed", raw),
        None => {
            let raw = record.require_created_on(index)?;
            parse_record_date(record, index, "createdOn", raw)
        }
    }
}

/// Whole days between the anchor date and `today`.
///
/// Negative when the anchor lies after `today` (clock skew in the inventory);
/// such buckets never pass a staleness threshold.
pub fn stale_days(record: &BucketRecord, index: usize, today: NaiveDate) -> Result<i64> {
    let anchor = staleness_anchor(record, index)?;
    Ok(today.signed_duration_since(anchor).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).unwrap()
    }

    #[test]
    fn uses_last_accessed_when_present() {
        let record = BucketRecord::new("a", "us-east-1", 120.0, "2023-01-01")
            .with_last_accessed("2024-01-01");
        assert_eq!(stale_days(&record, 0, day("2024-02-01")).unwrap(), 31);
    }

    #[test]
    fn falls_back_to_created_on() {
        let record = BucketRecord::new("a", "us-east-1", 120.0, "2023-01-01");
        let today = day("2024-02-01");
        let expected = (today - day("2023-01-01")).num_days();
        assert_eq!(stale_days(&record, 0, today).unwrap(), expected);
    }

    #[test]
    fn future_access_is_negative() {
        let record =
            BucketRecord::new("a", "us-east-1", 1.0, "2023-01-01").with_last_accessed("2024-03-01");
        assert_eq!(stale_days(&record, 0, day("2024-02-28")).unwrap(), -2);
    }

    #[test]
    fn unparseable_date_names_field() {
        let record =
            BucketRecord::new("a", "us-east-1", 1.0, "2023-01-01").with_last_accessed("last week");
        match stale_days(&record, 5, day("2024-01-01")) {
            Err(SlhError::InvalidDate { bucket, field, raw }) => {
                assert_eq!(bucket.index, 5);
                assert_eq!(field, "lastAccessed");
                assert_eq!(raw, "last week");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_created_on_without_access_is_missing_field() {
        let record = BucketRecord {
            created_on: None,
            ..BucketRecord::new("a", "us-east-1", 1.0, "2023-01-01")
        };
        assert!(matches!(
            stale_days(&record, 0, day("2024-01-01")),
            Err(SlhError::MissingField {
                field: "createdOn",
                ..
            })
        ));
    }

    #[test]
    fn created_on_is_not_parsed_when_access_date_exists() {
        let record = BucketRecord {
            created_on: Some("not-a-date".to_string()),
            ..BucketRecord::new("a", "us-east-1", 1.0, "2023-01-01")
        }
        .with_last_accessed("2024-01-10");
        assert_eq!(stale_days(&record, 0, day("2024-01-11")).unwrap(), 1);
    }
}
