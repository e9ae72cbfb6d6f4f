//! Per-shard `docMatchTree` cache for expensive metadata predicates
//! (spec.md §4.3: "materialized into a bitset over repos (or, for Meta, a
//! cached docMatchTree keyed by (field, checksum(regex)))", §4.8, §6:
//! "ZOEKT_DOCMATCHTREE_CACHE (integer; LRU capacity)").

use crate::lru::LruCache;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub const ENV_CAPACITY: &str = "ZOEKT_DOCMATCHTREE_CACHE";

/// A cached predicate result: one bit per document id in the shard it was
/// computed against.
pub type DocBitset = Arc<Vec<bool>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocMatchTreeKey {
    field: String,
    checksum: [u8; 32],
}

impl DocMatchTreeKey {
    pub fn new(field: impl Into<String>, pattern: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(pattern.as_bytes());
        Self {
            field: field.into(),
            checksum: hasher.finalize().into(),
        }
    }
}

pub struct DocMatchTreeCache {
    lru: LruCache<DocMatchTreeKey, DocBitset>,
}

impl DocMatchTreeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            lru: LruCache::new(capacity),
        }
    }

    /// Reads capacity from [`ENV_CAPACITY`] (spec.md §6); absent or
    /// unparseable defaults to 0 (disabled), matching "default 0 =
    /// disabled".
    pub fn from_env() -> Self {
        let capacity = std::env::var(ENV_CAPACITY)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Self::new(capacity)
    }

    pub fn capacity(&self) -> usize {
        self.lru.capacity()
    }

    pub fn get(&self, field: &str, pattern: &str) -> Option<DocBitset> {
        self.lru.get(&DocMatchTreeKey::new(field, pattern))
    }

    pub fn insert(&self, field: &str, pattern: &str, bitset: DocBitset) {
        self.lru.insert(DocMatchTreeKey::new(field, pattern), bitset);
    }

    /// Looks up the cache, computing and storing `compute`'s result on a
    /// miss. Idiomatic wrapper around the get/insert pair above for the
    /// `match-engine` compiler's `Meta` leaf.
    pub fn get_or_compute(
        &self,
        field: &str,
        pattern: &str,
        compute: impl FnOnce() -> Vec<bool>,
    ) -> DocBitset {
        if let Some(hit) = self.get(field, pattern) {
            return hit;
        }
        let computed: DocBitset = Arc::new(compute());
        self.insert(field, pattern, computed.clone());
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_miss_then_hit() {
        let cache = DocMatchTreeCache::new(4);
        assert!(cache.get("meta.owner", "^alice$").is_none());
        let mut calls = 0;
        let result = cache.get_or_compute("meta.owner", "^alice$", || {
            calls += 1;
            vec![true, false, true]
        });
        assert_eq!(*result, vec![true, false, true]);
        let result2 = cache.get_or_compute("meta.owner", "^alice$", || {
            calls += 1;
            vec![false; 3]
        });
        assert_eq!(*result2, vec![true, false, true]);
        assert_eq!(calls, 1);
    }

    #[test]
    fn different_patterns_are_distinct_keys() {
        let cache = DocMatchTreeCache::new(4);
        cache.insert("meta.owner", "a", Arc::new(vec![true]));
        cache.insert("meta.owner", "b", Arc::new(vec![false]));
        assert_eq!(*cache.get("meta.owner", "a").unwrap(), vec![true]);
        assert_eq!(*cache.get("meta.owner", "b").unwrap(), vec![false]);
    }
}
