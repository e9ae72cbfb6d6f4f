//! A generic capacity-bounded LRU (spec.md §4.8): "reads update recency;
//! writes evict the oldest when over capacity... thread-safe: reads take a
//! shared lock, writes take an exclusive lock." Grounded on
//! `search-cache/src/metadata_cache.rs`'s `BTreeMap`-of-indices shape,
//! generalized from a plain index (no eviction) into an actual LRU using
//! `hashbrown` for the backing map.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::hash::Hash;

struct Inner<K, V> {
    map: HashMap<K, V>,
    /// Most-recently-used key at the back. A key may appear more than once
    /// while stale; `touch` always consults `map` for the authoritative
    /// "does this key still exist" check, so duplicate entries just cost a
    /// few wasted scans instead of correctness bugs.
    order: VecDeque<K>,
    capacity: usize,
}

/// A capacity-bounded, thread-safe LRU map. `capacity == 0` disables
/// caching entirely: `get` always misses and `insert` is a no-op, matching
/// spec.md §6's "default 0 = disabled" for `ZOEKT_DOCMATCHTREE_CACHE`.
pub struct LruCache<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                map: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
                capacity,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    /// Looks up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        if self.capacity() == 0 {
            return None;
        }
        let mut inner = self.inner.write();
        let value = inner.map.get(key).cloned();
        if value.is_some() {
            inner.order.push_back(key.clone());
        }
        value
    }

    /// Inserts `key -> value`, evicting the least-recently-used entry if
    /// this would exceed capacity.
    pub fn insert(&self, key: K, value: V) {
        let capacity = self.capacity();
        if capacity == 0 {
            return;
        }
        let mut inner = self.inner.write();
        if !inner.map.contains_key(&key) && inner.map.len() >= capacity {
            while let Some(oldest) = inner.order.pop_front() {
                if inner.map.remove(&oldest).is_some() {
                    break;
                }
            }
        }
        inner.map.insert(key.clone(), value);
        inner.order.push_back(key);
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cache_never_stores() {
        let cache: LruCache<u32, u32> = LruCache::new(0);
        cache.insert(1, 10);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = LruCache::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        // touch 1 so it's more recent than 2
        assert_eq!(cache.get(&1), Some("a"));
        cache.insert(3, "c");
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn updating_existing_key_does_not_evict() {
        let cache = LruCache::new(1);
        cache.insert(1, "a");
        cache.insert(1, "b");
        assert_eq!(cache.get(&1), Some("b"));
        assert_eq!(cache.len(), 1);
    }
}
