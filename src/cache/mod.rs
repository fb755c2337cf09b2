//! Cache Module
//!
//! Provides in-memory caching with LFU eviction and lazy TTL expiration.

use std::time::Duration;

mod entry;
mod frequency;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use frequency::{BucketKeys, FrequencyIndex};
pub use stats::CacheStats;
pub use store::FrequencyBucketCache;

// == Public Constants ==
/// Idle TTL used when a cache is built from a capacity alone
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
