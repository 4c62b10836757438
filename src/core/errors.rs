//! SLH-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SlhError>;

/// Identifies one record of the inventory: its position, plus its name once known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRef {
    pub index: usize,
    pub name: Option<String>,
}

impl BucketRef {
    #[must_use]
    pub fn new(index: usize, name: Option<&str>) -> Self {
        Self {
            index,
            name: name.map(str::to_string),
        }
    }
}

impl fmt::Display for BucketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#{} ({name})", self.index),
            None => write!(f, "#{}", self.index),
        }
    }
}

/// Top-level error type for Storage Lifecycle Helper.
#[derive(Debug, Error)]
pub enum SlhError {
    #[error("[SLH-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SLH-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SLH-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SLH-2001] bucket {bucket} is missing required field `{field}`")]
    MissingField {
        bucket: BucketRef,
        field: &'static str,
    },

    #[error("[SLH-2002] bucket {bucket} has unparseable date in `{field}`: {raw:?}")]
    InvalidDate {
        bucket: BucketRef,
        field: &'static str,
        raw: String,
    },

    #[error("[SLH-2003] bucket {bucket} has invalid sizeGB: {value}")]
    InvalidSize { bucket: BucketRef, value: f64 },

    #[error("[SLH-2004] duplicate bucket name {name:?} at #{first} and #{second}")]
    DuplicateBucket {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("[SLH-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SLH-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SlhError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SLH-1001",
            Self::MissingConfig { .. } => "SLH-1002",
            Self::ConfigParse { .. } => "SLH-1003",
            Self::MissingField { .. } => "SLH-2001",
            Self::InvalidDate { .. } => "SLH-2002",
            Self::InvalidSize { .. } => "SLH-2003",
            Self::DuplicateBucket { .. } => "SLH-2004",
            Self::Serialization { .. } => "SLH-2101",
            Self::Io { .. } => "SLH-3002",
        }
    }

    /// Whether the failure points at a specific inventory record.
    #[must_use]
    pub const fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidSize { .. }
                | Self::DuplicateBucket { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for SlhError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SlhError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
