//! freq_cache - An in-memory LFU cache
//!
//! Evicts the least frequently used entry (oldest first among ties) and
//! expires entries lazily once they have been idle for longer than a TTL.

pub mod cache;
pub mod config;
pub mod error;
pub mod shared;
pub mod tasks;

pub use cache::{CacheStats, FrequencyBucketCache, DEFAULT_TTL};
pub use config::Config;
pub use error::{CacheError, Result};
pub use shared::SharedCache;
pub use tasks::{spawn_purge_task, spawn_purge_task_from_config};
