//! Shared Cache Module
//!
//! Thread-safe handle over a single cache instance.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, FrequencyBucketCache};
use crate::config::Config;
use crate::error::Result;

// == Shared Cache ==
/// Cloneable handle to a cache guarded by one exclusive lock.
///
/// Every operation holds the lock for its whole duration, so the entry map,
/// the frequency buckets and the minimum frequency are always observed in a
/// consistent state. A plain mutex is used rather than a read-write lock
/// because `get` mutates frequencies.
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<FrequencyBucketCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Wraps an existing cache.
    pub fn new(cache: FrequencyBucketCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Creates a shared cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        FrequencyBucketCache::from_config(config).map(Self::new)
    }

    /// Retrieves a clone of the value, counting the access.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().await.get(key).cloned()
    }

    pub async fn put(&self, key: K, value: V) {
        self.inner.lock().await.put(key, value);
    }

    pub async fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().await.remove(key);
    }

    pub async fn size(&self) -> usize {
        self.inner.lock().await.size()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    /// Removes all expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.inner.lock().await.purge_expired()
    }

    /// Runs `f` with exclusive access, for compound operations that must
    /// not interleave with other callers.
    pub async fn with_lock<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut FrequencyBucketCache<K, V>) -> R,
    {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}
