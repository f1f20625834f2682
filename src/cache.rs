//! Bounded key → value cache with least-recently-used eviction.
//!
//! Handed explicitly to whatever needs memoization (username → id lookups,
//! per-post comment trees) instead of living in module-level state.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache entry
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    /// Access stamp for LRU eviction
    last_access: u64,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    clock: u64,
}

/// Thread-safe lookup cache; clones share storage.
///
/// A capacity of `0` means unbounded.
#[derive(Debug, Clone)]
pub struct LookupCache<K, V> {
    inner: Arc<Mutex<Inner<K, V>>>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> Default for LookupCache<K, V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> LookupCache<K, V> {
    /// Create a cache holding at most `capacity` entries
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                clock: 0,
            })),
            capacity,
        }
    }

    /// Create a cache without an entry limit
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a value, replacing any previous one for the key
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.lock();
        inner.clock += 1;
        let stamp = inner.clock;

        if self.capacity > 0
            && inner.entries.len() >= self.capacity
            && !inner.entries.contains_key(&key)
        {
            evict_oldest(&mut inner.entries);
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                last_access: stamp,
            },
        );
    }

    /// Get a value, marking it recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        inner.clock += 1;
        let stamp = inner.clock;
        inner.entries.get_mut(key).map(|entry| {
            entry.last_access = stamp;
            entry.value.clone()
        })
    }

    /// Get a value, computing and storing it on a miss
    pub fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = make();
        self.insert(key, value.clone());
        value
    }

    /// Check if a key is cached
    pub fn contains(&self, key: &K) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Remove a key, returning its value
    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().entries.remove(key).map(|entry| entry.value)
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Entry limit (`0` = unbounded)
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

fn evict_oldest<K: Eq + Hash + Clone, V>(entries: &mut HashMap<K, Entry<V>>) {
    if let Some(oldest_key) = entries
        .iter()
        .min_by_key(|(_, entry)| entry.last_access)
        .map(|(key, _)| key.clone())
    {
        entries.remove(&oldest_key);
    }
}
