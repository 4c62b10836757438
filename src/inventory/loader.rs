//! JSON inventory loading: `{ "buckets": [ ... ] }`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::errors::{Result, SlhError};
use crate::inventory::record::BucketRecord;

#[derive(Debug, Deserialize)]
struct InventoryDocument {
    buckets: Vec<BucketRecord>,
}

/// Read and decode an inventory file. Records keep document order.
pub fn load_inventory(path: &Path) -> Result<Vec<BucketRecord>> {
    let raw = fs::read_to_string(path).map_err(|source| SlhError::io(path, source))?;
    parse_inventory(&raw)
}

/// Decode an inventory document from a JSON string.
pub fn parse_inventory(raw: &str) -> Result<Vec<BucketRecord>> {
    let document: InventoryDocument =
        serde_json::from_str(raw).map_err(|error| SlhError::Serialization {
            context: "inventory",
            details: error.to_string(),
        })?;
    Ok(document.buckets)
}

/// Reject inventories where two records share a name.
///
/// Records without a name are skipped here; they fail later with
/// `MissingField` from whichever view needs the name.
pub fn ensure_unique_names(records: &[BucketRecord]) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let Some(name) = record.name.as_deref() else {
            continue;
        };
        if let Some(&first) = seen.get(name) {
            return Err(SlhError::DuplicateBucket {
                name: name.to_string(),
                first,
                second: index,
            });
        }
        seen.insert(name, index);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "buckets": [
            {"name": "a", "region": "us-east-1", "sizeGB": 120, "versioning": true,
             "createdOn": "2023-01-01", "lastAccessed": "2024-01-01", "tags": {"team": "infra"}},
            {"name": "b", "region": "eu-west-1", "sizeGB": 60, "versioning": false,
             "createdOn": "2023-06-01", "tags": {"team": "data"}}
        ]
    }"#;

    #[test]
    fn parses_records_in_document_order() {
        let records = parse_inventory(SAMPLE).expect("inventory should parse");
        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(records[1].last_accessed, None);
    }

    #[test]
    fn missing_buckets_array_is_rejected() {
        let err = parse_inventory(r#"{"items": []}"#).unwrap_err();
        match err {
            SlhError::Serialization { context, details } => {
                assert_eq!(context, "inventory");
                assert!(details.contains("buckets"), "{details}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_inventory_is_valid() {
        let records = parse_inventory(r#"{"buckets": []}"#).expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("buckets.json");
        fs::write(&path, SAMPLE).expect("write inventory");

        let records = load_inventory(&path).expect("load");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_inventory(Path::new("/nonexistent/slh/buckets.json")).unwrap_err();
        assert_eq!(err.code(), "SLH-3002");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let records = vec![
            BucketRecord::new("a", "us-east-1", 1.0, "2024-01-01"),
            BucketRecord::new("b", "us-east-1", 1.0, "2024-01-01"),
            BucketRecord::new("a", "eu-west-1", 1.0, "2024-01-01"),
        ];
        match ensure_unique_names(&records) {
            Err(SlhError::DuplicateBucket {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "a");
                assert_eq!((first, second), (0, 2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
