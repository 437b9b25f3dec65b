// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
    seq: u64,
}

struct TtlInner<V> {
    entries: HashMap<String, TtlEntry<V>>,
    next_seq: u64,
}

/// Process-local memo with lazy TTL expiry and insertion-order (FIFO)
/// eviction. Safe to share; concurrent misses may both compute and the last
/// write wins.
pub struct TtlCache<V> {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<TtlInner<V>>,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(TtlInner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    #[must_use]
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = inner
            .entries
            .get(key)
            .map(|e| now.saturating_duration_since(e.inserted_at) < self.ttl)?;
        if fresh {
            inner.entries.get(key).map(|e| e.value.clone())
        } else {
            inner.entries.remove(key);
            None
        }
    }

    /// Overwriting a live key refreshes its age but keeps its insertion
    /// sequence number, so it is evicted no later than before.
    pub fn insert_at(&self, key: String, value: V, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.value = value;
            entry.inserted_at = now;
            return;
        }
        if inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone());
            if let Some(victim) = oldest {
                inner.entries.remove(&victim);
            }
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            TtlEntry {
                value,
                inserted_at: now,
                seq,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
    }
}
