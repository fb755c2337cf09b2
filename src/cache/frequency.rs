//! Frequency Index Module
//!
//! Tracks which keys sit at which access frequency, for LFU eviction.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

const OUT_OF_SYNC: &str = "frequency index out of sync";

// == Link ==
/// Position of a key: its bucket and its neighbours inside that bucket.
#[derive(Debug, Clone)]
struct Link<K> {
    frequency: u64,
    prev: Option<K>,
    next: Option<K>,
}

// == Bucket ==
/// Insertion-ordered list of the keys sharing one frequency.
///
/// The list is threaded through `FrequencyIndex::links`, so the bucket only
/// stores its ends.
#[derive(Debug, Clone)]
struct Bucket<K> {
    /// Oldest key at this frequency (next eviction candidate)
    head: Option<K>,
    /// Most recently added key
    tail: Option<K>,
    len: usize,
}

impl<K> Bucket<K> {
    fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }
}

// == Frequency Index ==
/// Maps each frequency to the keys currently at that frequency.
///
/// - Each bucket keeps FIFO order: the head is the key that entered the
///   bucket first and is evicted first among ties.
/// - Empty buckets are dropped immediately.
/// - `min_frequency` is the smallest bucket key, `None` when empty.
#[derive(Debug, Clone)]
pub struct FrequencyIndex<K> {
    buckets: BTreeMap<u64, Bucket<K>>,
    links: HashMap<K, Link<K>>,
    min_frequency: Option<u64>,
}

impl<K: Hash + Eq + Clone> Default for FrequencyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> FrequencyIndex<K> {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            links: HashMap::new(),
            min_frequency: None,
        }
    }

    // == Insert ==
    /// Adds a new key at frequency 1.
    ///
    /// A fresh key always becomes (or ties) the minimum, so the minimum is
    /// reset to 1. Inserting a key that is already indexed does nothing and
    /// returns false.
    pub fn insert(&mut self, key: K) -> bool {
        if self.links.contains_key(&key) {
            return false;
        }
        self.push_back(1, key);
        self.min_frequency = Some(1);
        true
    }

    // == Promote ==
    /// Moves a key to the next frequency, appending it to that bucket.
    ///
    /// Returns the new frequency, or None if the key is not indexed.
    pub fn promote<Q>(&mut self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (key, frequency, emptied) = self.unlink(key)?;
        if emptied && self.min_frequency == Some(frequency) {
            self.min_frequency = Some(frequency + 1);
        }
        self.push_back(frequency + 1, key);
        Some(frequency + 1)
    }

    // == Remove ==
    /// Removes a key, returning it with the frequency it had.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, u64)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (key, frequency, emptied) = self.unlink(key)?;
        if emptied && self.min_frequency == Some(frequency) {
            self.min_frequency = self.buckets.keys().next().copied();
        }
        Some((key, frequency))
    }

    // == Pop Min ==
    /// Removes and returns the eviction candidate: the oldest key in the
    /// lowest-frequency bucket, with its frequency.
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        let frequency = self.min_frequency?;
        let head = self.buckets.get(&frequency)?.head.clone()?;
        self.remove(&head)
    }

    // == Peek Min ==
    /// Returns the eviction candidate without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        let frequency = self.min_frequency?;
        let head = self.buckets.get(&frequency)?.head.as_ref()?;
        Some((head, frequency))
    }

    /// Current frequency of a key.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.links.get(key).map(|link| link.frequency)
    }

    /// Smallest frequency with at least one key.
    pub fn min_frequency(&self) -> Option<u64> {
        self.min_frequency
    }

    /// Keys at `frequency`, oldest first.
    pub fn keys_at(&self, frequency: u64) -> BucketKeys<'_, K> {
        BucketKeys {
            links: &self.links,
            cursor: self.buckets.get(&frequency).and_then(|b| b.head.as_ref()),
        }
    }

    /// Frequencies that currently hold keys, ascending.
    pub fn frequencies(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.keys().copied()
    }

    /// Number of keys at `frequency`.
    pub fn bucket_len(&self, frequency: u64) -> usize {
        self.buckets.get(&frequency).map_or(0, |b| b.len)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.links.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.links.clear();
        self.min_frequency = None;
    }

    // == Internal List Operations ==

    fn push_back(&mut self, frequency: u64, key: K) {
        let bucket = self.buckets.entry(frequency).or_insert_with(Bucket::new);
        let prev = bucket.tail.replace(key.clone());
        match &prev {
            Some(prev_key) => {
                self.links.get_mut(prev_key).expect(OUT_OF_SYNC).next = Some(key.clone());
            }
            None => bucket.head = Some(key.clone()),
        }
        bucket.len += 1;
        self.links.insert(
            key,
            Link {
                frequency,
                prev,
                next: None,
            },
        );
    }

    /// Unlinks a key from the bucket it sits in.
    ///
    /// Returns the owned key, its frequency and whether its bucket emptied.
    fn unlink<Q>(&mut self, key: &Q) -> Option<(K, u64, bool)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (key, link) = self.links.remove_entry(key)?;
        let emptied = self.detach(&link);
        Some((key, link.frequency, emptied))
    }

    /// Joins a removed key's neighbours, dropping the bucket when it empties.
    fn detach(&mut self, link: &Link<K>) -> bool {
        let bucket = self.buckets.get_mut(&link.frequency).expect(OUT_OF_SYNC);

        match &link.prev {
            Some(prev_key) => {
                self.links.get_mut(prev_key).expect(OUT_OF_SYNC).next = link.next.clone();
            }
            None => bucket.head = link.next.clone(),
        }
        match &link.next {
            Some(next_key) => {
                self.links.get_mut(next_key).expect(OUT_OF_SYNC).prev = link.prev.clone();
            }
            None => bucket.tail = link.prev.clone(),
        }

        bucket.len -= 1;
        let emptied = bucket.len == 0;
        if emptied {
            self.buckets.remove(&link.frequency);
        }
        emptied
    }

    /// Panics if the buckets, links and minimum disagree.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut total = 0;
        for (&frequency, bucket) in &self.buckets {
            assert!(bucket.len > 0, "empty bucket {} kept", frequency);
            let walked: Vec<&K> = self.keys_at(frequency).collect();
            assert_eq!(walked.len(), bucket.len, "bucket {} length", frequency);
            assert!(bucket.tail.as_ref() == walked.last().copied());
            for key in walked {
                assert_eq!(self.links[key].frequency, frequency);
            }
            total += bucket.len;
        }
        assert_eq!(total, self.links.len(), "every key in exactly one bucket");
        assert_eq!(self.min_frequency, self.buckets.keys().next().copied());
    }
}

// == Bucket Iterator ==
/// Iterator over the keys of one bucket, oldest first.
pub struct BucketKeys<'a, K> {
    links: &'a HashMap<K, Link<K>>,
    cursor: Option<&'a K>,
}

impl<'a, K: Hash + Eq> Iterator for BucketKeys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.links.get(current).and_then(|link| link.next.as_ref());
        Some(current)
    }
}
