//! Bucket inventory records as they arrive from the input document.
//!
//! Every field is optional at the wire level so that a malformed record can be
//! reported precisely (`MissingField` naming the field and the record index)
//! by whichever view first needs the value, instead of failing the whole
//! document with a generic decode error.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{BucketRef, Result, SlhError};

/// Versioning state: inventories carry either a boolean or a provider status string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Versioning {
    Flag(bool),
    Status(String),
}

impl fmt::Display for Versioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(true) => f.write_str("Enabled"),
            Self::Flag(false) => f.write_str("Disabled"),
            Self::Status(status) => f.write_str(status),
        }
    }
}

/// Ownership tags attached to a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// One storage bucket of the inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, rename = "sizeGB", skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning: Option<Versioning>,
    /// Creation date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    /// Last access date, `YYYY-MM-DD`. Absent means never accessed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BucketTags>,
}

impl BucketRecord {
    /// Complete record with versioning disabled, no access date and no team tag.
    #[must_use]
    pub fn new(name: &str, region: &str, size_gb: f64, created_on: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            region: Some(region.to_string()),
            size_gb: Some(size_gb),
            versioning: Some(Versioning::Flag(false)),
            created_on: Some(created_on.to_string()),
            last_accessed: None,
            tags: None,
        }
    }

    #[must_use]
    pub fn with_last_accessed(mut self, date: &str) -> Self {
        self.last_accessed = Some(date.to_string());
        self
    }

    #[must_use]
    pub fn with_team(mut self, team: &str) -> Self {
        self.tags = Some(BucketTags {
            team: Some(team.to_string()),
        });
        self
    }

    #[must_use]
    pub fn with_versioning(mut self, versioning: Versioning) -> Self {
        self.versioning = Some(versioning);
        self
    }

    /// Error-reporting handle for this record at `index`.
    #[must_use]
    pub fn bucket_ref(&self, index: usize) -> BucketRef {
        BucketRef::new(index, self.name.as_deref())
    }

    pub fn require_name(&self, index: usize) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| self.missing(index, "name"))
    }

    pub fn require_region(&self, index: usize) -> Result<&str> {
        self.region
            .as_deref()
            .ok_or_else(|| self.missing(index, "region"))
    }

    /// Size in GB; must be finite and non-negative. Zero is valid.
    pub fn require_size_gb(&self, index: usize) -> Result<f64> {
        let value = self.size_gb.ok_or_else(|| self.missing(index, "sizeGB"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(SlhError::InvalidSize {
                bucket: self.bucket_ref(index),
                value,
            });
        }
        Ok(value)
    }

    pub fn require_versioning(&self, index: usize) -> Result<&Versioning> {
        self.versioning
            .as_ref()
            .ok_or_else(|| self.missing(index, "versioning"))
    }

    pub fn require_created_on(&self, index: usize) -> Result<&str> {
        self.created_on
            .as_deref()
            .ok_or_else(|| self.missing(index, "createdOn"))
    }

    pub fn require_team(&self, index: usize) -> Result<&str> {
        self.tags
            .as_ref()
            .and_then(|tags| tags.team.as_deref())
            .ok_or_else(|| self.missing(index, "tags.team"))
    }

    fn missing(&self, index: usize, field: &'static str) -> SlhError {
        SlhError::MissingField {
            bucket: self.bucket_ref(index),
            field,
        }
    }
}
