//! Expiration Purge Task
//!
//! Background task that periodically removes expired entries from a shared cache.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::shared::SharedCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// Without this task, expired entries keep their slot until a `get` finds
/// them or capacity pressure evicts them. With it, they are dropped within one
/// `interval` of expiring.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop purging.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::new(FrequencyBucketCache::with_capacity(1000));
/// let purge_handle = spawn_purge_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task<K, V>(cache: SharedCache<K, V>, interval: Duration) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!(interval = ?interval, "Starting expiration purge task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;

            if removed > 0 {
                info!(removed, "Expiration purge removed entries");
            } else {
                debug!("Expiration purge found nothing to remove");
            }
        }
    })
}

/// Starts the purge task if `config` sets a purge interval.
///
/// Returns None when `config.purge_interval` is unset, leaving the cache on
/// lazy expiration only.
pub fn spawn_purge_task_from_config<K, V>(
    cache: &SharedCache<K, V>,
    config: &Config,
) -> Option<JoinHandle<()>>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    config
        .purge_interval
        .map(|interval| spawn_purge_task(cache.clone(), interval))
}
