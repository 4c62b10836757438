#![forbid(unsafe_code)]

//! Storage Lifecycle Helper (slh) — batch reporting and lifecycle
//! classification for cloud storage bucket inventories.
//!
//! From one inventory and one reference date it derives:
//! 1. **Summary** — name, region, size and versioning per bucket
//! 2. **Unused buckets** — large and not accessed for a long time
//! 3. **Cost rollups** — projected monthly cost by region and by team
//! 4. **Deletion queue / archival candidates** — an ordered, disjoint split
//! 5. **Savings** — what moving archival candidates to cold storage saves
//!
//! # Library usage
//!
//! ```rust,no_run
//! use storage_lifecycle_helper::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let records = load_inventory(std::path::Path::new("buckets.json"))?;
//! let today = chrono::Local::now().date_naive();
//! let report = LifecycleEngine::from_config(&Config::default()).evaluate(&records, today)?;
//! println!("{} buckets queued for deletion", report.classification.deletion_queue.len());
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod inventory;
pub mod lifecycle;
pub mod logger;
