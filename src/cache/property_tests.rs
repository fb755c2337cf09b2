//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against its invariants and against a
//! straightforward reference model of LFU with FIFO tie-breaking.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::FrequencyBucketCache;

// == Test Configuration ==
const TEST_CAPACITY: usize = 4;
const KEY_SPACE: u8 = 10;

// == Strategies ==
/// Keys drawn from a small space so operations collide often
fn key_strategy() -> impl Strategy<Value = u8> {
    0..KEY_SPACE
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{0,8}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u8, value: String },
    Get { key: u8 },
    Remove { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

// == Reference Model ==
/// Linear-scan LFU: evicts the lowest frequency, and among those the key that
/// reached that frequency first.
#[derive(Debug, Default)]
struct ModelCache {
    capacity: usize,
    /// key -> (value, frequency, tick when it reached that frequency)
    entries: HashMap<u8, (String, u64, u64)>,
    tick: u64,
}

impl ModelCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn get(&mut self, key: u8) -> Option<String> {
        let tick = self.next_tick();
        let (value, frequency, since) = self.entries.get_mut(&key)?;
        *frequency += 1;
        *since = tick;
        Some(value.clone())
    }

    fn put(&mut self, key: u8, value: String) {
        if self.capacity == 0 {
            return;
        }
        let tick = self.next_tick();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.0 = value;
            entry.1 += 1;
            entry.2 = tick;
            return;
        }
        if self.entries.len() >= self.capacity {
            let victim = self
                .entries
                .iter()
                .min_by_key(|(_, (_, frequency, since))| (*frequency, *since))
                .map(|(key, _)| *key);
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(key, (value, 1, tick));
    }

    fn remove(&mut self, key: u8) {
        self.entries.remove(&key);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of operations, the cache agrees with the reference
    // model on every lookup, every frequency and every surviving key.
    #[test]
    fn prop_matches_reference_model(
        capacity in 0..=TEST_CAPACITY,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut cache = FrequencyBucketCache::with_capacity(capacity);
        let mut model = ModelCache::new(capacity);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key, value.clone());
                    model.put(key, value);
                }
                CacheOp::Get { key } => {
                    let actual = cache.get(&key).cloned();
                    let expected = model.get(key);
                    prop_assert_eq!(actual, expected, "get({}) disagrees", key);
                }
                CacheOp::Remove { key } => {
                    cache.remove(&key);
                    model.remove(key);
                }
            }

            cache.assert_invariants();
            prop_assert_eq!(cache.size(), model.entries.len());
            for (key, (_, frequency, _)) in &model.entries {
                prop_assert_eq!(cache.frequency(key), Some(*frequency));
            }
        }
    }

    // For any sequence of operations, size() never exceeds the capacity.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1..=TEST_CAPACITY,
        ops in prop::collection::vec(cache_op_strategy(), 1..200)
    ) {
        let mut cache = FrequencyBucketCache::with_capacity(capacity);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => cache.put(key, value),
                CacheOp::Get { key } => {
                    cache.get(&key);
                }
                CacheOp::Remove { key } => cache.remove(&key),
            }
            prop_assert!(
                cache.size() <= capacity,
                "Cache size {} exceeds capacity {}",
                cache.size(),
                capacity
            );
        }
    }

    // Hits and misses reported by stats match what callers observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut cache = FrequencyBucketCache::with_capacity(TEST_CAPACITY);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => cache.put(key, value),
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Remove { key } => cache.remove(&key),
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, cache.size(), "Total entries mismatch");
    }

    // Storing a pair and reading it back returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in "[a-zA-Z0-9_]{1,64}", value in value_strategy()) {
        let mut cache = FrequencyBucketCache::with_capacity(TEST_CAPACITY);

        cache.put(key.clone(), value.clone());
        prop_assert_eq!(cache.get(key.as_str()), Some(&value));
    }

    // Writing V1 then V2 under one key leaves V2, one entry, frequency 2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut cache = FrequencyBucketCache::with_capacity(TEST_CAPACITY);

        cache.put(key, value1);
        cache.put(key, value2.clone());

        prop_assert_eq!(cache.frequency(&key), Some(2));
        prop_assert_eq!(cache.get(&key), Some(&value2));
        prop_assert_eq!(cache.size(), 1);
    }

    // Removing an absent key never changes the size.
    #[test]
    fn prop_remove_absent_is_noop(
        present in prop::collection::hash_set(0..5u8, 0..4),
        absent in 5..KEY_SPACE
    ) {
        let mut cache = FrequencyBucketCache::with_capacity(TEST_CAPACITY);
        for key in &present {
            cache.put(*key, String::new());
        }
        let before = cache.size();

        cache.remove(&absent);
        prop_assert_eq!(cache.size(), before);
        cache.assert_invariants();
    }

    // An entry read again before its idle time exceeds the TTL stays live;
    // once the idle time exceeds the TTL, get misses and the entry is gone.
    #[test]
    fn prop_ttl_expiration_behavior(
        ttl_ms in 1u64..10_000,
        within in 0u64..=100,
        beyond in 1u64..10_000
    ) {
        let ttl = Duration::from_millis(ttl_ms);
        let mut cache: FrequencyBucketCache<u8, u8> = FrequencyBucketCache::new(TEST_CAPACITY, ttl).unwrap();
        let start = Instant::now();
        cache.put_at(1, 1, start);

        let live_at = start + ttl * within as u32 / 100;
        prop_assert_eq!(cache.get_at(&1, live_at), Some(&1));

        let expired_at = live_at + ttl + Duration::from_millis(beyond);
        prop_assert_eq!(cache.get_at(&1, expired_at), None);
        prop_assert_eq!(cache.size(), 0);
        cache.assert_invariants();
    }
}
