// src/dedup.rs
//! Bounded FIFO set of seen fingerprints.
//!
//! Insertion order is first-seen order. When the cap is exceeded the oldest
//! entries go first. Membership is a hash lookup; the deque only tracks age.

use std::collections::{HashSet, VecDeque};

use crate::fingerprint::Fingerprint;

pub const DEFAULT_DEDUP_CAPACITY: usize = 8000;

#[derive(Debug, Clone)]
pub struct DedupStore {
    order: VecDeque<Fingerprint>,
    members: HashSet<Fingerprint>,
    capacity: usize,
}

impl Default for DedupStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEDUP_CAPACITY)
    }
}

impl DedupStore {
    /// `capacity` of 0 is treated as 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from a persisted oldest-first sequence. Repeats are skipped and
    /// the cap is applied, so only the newest `capacity` entries survive.
    pub fn from_persisted<I>(seq: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        let mut store = Self::with_capacity(capacity);
        for fp in seq {
            store.record(fp);
        }
        store
    }

    pub fn is_new(&self, fp: &Fingerprint) -> bool {
        !self.members.contains(fp)
    }

    /// Insert `fp` (no-op if already present), then evict oldest-first down to the cap.
    pub fn record(&mut self, fp: Fingerprint) {
        if !self.members.insert(fp.clone()) {
            return;
        }
        self.order.push_back(fp);
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.members.remove(&old);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }
}
