//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use storage_lifecycle_helper::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, RateConfig, ThresholdConfig};
pub use crate::core::errors::{BucketRef, Result, SlhError};

// Inventory
pub use crate::inventory::loader::{load_inventory, parse_inventory};
pub use crate::inventory::record::{BucketRecord, BucketTags, Versioning};

// Lifecycle
pub use crate::lifecycle::classify::{Classification, ClassificationRules, LifecycleAction};
pub use crate::lifecycle::cost::{CostReport, CostRollup};
pub use crate::lifecycle::engine::{LifecycleEngine, LifecycleReport};
pub use crate::lifecycle::savings::{SavingsReport, SavingsRow};
pub use crate::lifecycle::summary::SummaryRow;
pub use crate::lifecycle::unused::{UnusedBucket, UnusedCriteria};

// Logging
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
