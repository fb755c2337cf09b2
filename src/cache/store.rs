//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with frequency buckets and
//! lazy TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, FrequencyIndex, DEFAULT_TTL};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Frequency Bucket Cache ==
/// Bounded cache evicting the least frequently used entry, oldest first
/// among equal frequencies.
///
/// Every successful `get` and every `put` on an existing key counts as a use.
/// Entries idle for longer than the TTL are dropped when a `get` finds them;
/// until then they still occupy a slot and count toward `size()`.
#[derive(Debug, Clone)]
pub struct FrequencyBucketCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Keys grouped by access frequency
    frequencies: FrequencyIndex<K>,
    /// Hit/miss/eviction counters
    stats: CacheStats,
    /// Maximum number of entries, 0 = store nothing
    capacity: usize,
    /// Idle time after which an entry expires
    ttl: Duration,
}

impl<K, V> FrequencyBucketCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new cache with the given capacity and idle TTL.
    ///
    /// Fails with `InvalidArgument` when `ttl` is zero.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidArgument(
                "ttl must be a positive duration".to_string(),
            ));
        }
        Ok(Self::build(capacity, ttl))
    }

    /// Creates a new cache with the default one hour TTL.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, DEFAULT_TTL)
    }

    /// Creates a new cache from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.capacity, config.ttl)
    }

    fn build(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            frequencies: FrequencyIndex::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key, counting the access.
    ///
    /// Returns None when the key is absent or expired. An expired entry is
    /// removed as a side effect.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at<Q>(&mut self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(self.ttl, now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!(ttl = ?self.ttl, "Removed expired entry on access");
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        debug_assert_eq!(self.frequencies.frequency(key), Some(entry.frequency));
        let frequency = entry.touch(now);
        let promoted = self.frequencies.promote(key);
        debug_assert_eq!(promoted, Some(frequency));
        self.stats.record_hit();
        trace!(frequency, "Cache hit");
        Some(&entry.value)
    }

    // == Put ==
    /// Stores a key-value pair.
    ///
    /// Updating an existing key overwrites the value and counts as a use. A
    /// new key entering a full cache first evicts the least frequently used
    /// entry. With capacity 0 the call does nothing.
    pub fn put(&mut self, key: K, value: V) {
        self.put_at(key, value, Instant::now());
    }

    pub(crate) fn put_at(&mut self, key: K, value: V, now: Instant) {
        if self.capacity == 0 {
            trace!("Zero capacity cache, put ignored");
            return;
        }

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            debug_assert_eq!(self.frequencies.frequency(&key), Some(entry.frequency));
            let frequency = entry.touch(now);
            let promoted = self.frequencies.promote(&key);
            debug_assert_eq!(promoted, Some(frequency));
            trace!(frequency, "Updated existing entry");
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict();
        }

        let inserted = self.frequencies.insert(key.clone());
        debug_assert!(inserted, "new key already indexed");
        self.entries.insert(key, CacheEntry::new(value, now));
        self.stats.set_total_entries(self.entries.len());
        debug_assert!(self.entries.len() <= self.capacity);
    }

    // == Remove ==
    /// Removes an entry by key. Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(key);
    }

    /// Removes an entry by key and returns its value.
    ///
    /// The value is returned even if the entry had already expired.
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|entry| entry.value)
    }

    // == Size ==
    /// Returns the number of entries held, including expired entries that
    /// have not been accessed since they expired.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Peek ==
    /// Reads a value without counting an access.
    ///
    /// Returns None for an expired entry but leaves it in place.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl, now))
            .map(|entry| &entry.value)
    }

    /// Returns true if the key is present and not expired. No side effects.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek(key).is_some()
    }

    /// Returns the current access count of a key.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.frequency)
    }

    /// Returns how long a key has left before it expires, zero if it
    /// already has. Does not count as an access.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .get(key)
            .map(|entry| entry.ttl_remaining(self.ttl, now))
    }

    /// Smallest access count among held entries, None when empty.
    pub fn min_frequency(&self) -> Option<u64> {
        self.frequencies.min_frequency()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.frequencies.clear();
        self.stats.set_total_entries(0);
        debug!(dropped, "Cache cleared");
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Expiration is otherwise only discovered by `get`; this sweep runs only
    /// when the caller asks for it. Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&mut self, now: Instant) -> usize {
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key);
        }

        self.stats.record_expirations(count);
        if count > 0 {
            debug!(count, "Purged expired entries");
        }
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Internal ==

    /// Evicts the oldest entry of the lowest frequency bucket.
    fn evict(&mut self) -> Option<(K, V)> {
        let (key, frequency) = self.frequencies.pop_min()?;
        let entry = self.entries.remove(&key);
        debug_assert!(entry.is_some(), "evicted key missing from entries");
        self.stats.record_eviction();
        debug!(frequency, "Evicted least frequently used entry");
        entry.map(|entry| (key, entry.value))
    }

    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        let removed = self.frequencies.remove(key);
        debug_assert_eq!(removed.map(|(_, f)| f), Some(entry.frequency));
        self.stats.set_total_entries(self.entries.len());
        Some(entry)
    }

    /// Panics if entries and frequency buckets disagree.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.frequencies.assert_invariants();
        assert_eq!(self.entries.len(), self.frequencies.len());
        for (key, entry) in &self.entries {
            assert!(
                self.frequencies.keys_at(entry.frequency).any(|k| k == key),
                "entry not in the bucket matching its frequency"
            );
        }
        if self.capacity > 0 {
            assert!(self.entries.len() <= self.capacity);
        }
    }
}
