//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with access-frequency
//! and idle-TTL bookkeeping.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Number of accesses (get or put-update), starts at 1
    pub frequency: u64,
    /// Instant of the most recent successful get or put
    pub last_access: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry at frequency 1, accessed at `now`.
    pub fn new(value: V, now: Instant) -> Self {
        Self {
            value,
            frequency: 1,
            last_access: now,
        }
    }

    // == Touch ==
    /// Records one access: bumps the frequency and refreshes the access time.
    ///
    /// Returns the new frequency.
    pub fn touch(&mut self, now: Instant) -> u64 {
        self.frequency += 1;
        self.last_access = now;
        self.frequency
    }

    // == Is Expired ==
    /// Checks if the entry has been idle for longer than `ttl`.
    ///
    /// Boundary condition: an entry idle for exactly `ttl` is still live; it
    /// expires once the idle time strictly exceeds the TTL.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_access) > ttl
    }

    // == Time To Live ==
    /// Returns how long the entry has left before it expires, zero if it
    /// already has.
    pub fn ttl_remaining(&self, ttl: Duration, now: Instant) -> Duration {
        ttl.saturating_sub(now.saturating_duration_since(self.last_access))
    }
}
