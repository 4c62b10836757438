//! Lifecycle engine: summary, unused-bucket filter, cost rollups,
//! deletion/archival classification and cold-storage savings.

pub mod classify;
pub mod cost;
pub mod engine;
pub mod savings;
pub mod staleness;
pub mod summary;
pub mod unused;
