//! Bucket inventory: record model and JSON loading.

pub mod loader;
pub mod record;
