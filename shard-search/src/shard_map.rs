//! The shard key → `RankedShard` mapping (spec.md §4.6), with a
//! priority-sorted view cached until the map changes. spec.md §5: "the
//! shard map is protected by a read-write lock... the sort cache is
//! populated under the read lock and invalidated under the write lock (via
//! a generation counter)."

use crate::ranked_shard::RankedShard;
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

#[derive(Default)]
pub struct ShardMap {
    inner: RwLock<HashMap<String, Arc<RankedShard>>>,
    generation: AtomicU64,
    sort_cache: Mutex<Option<(u64, Arc<Vec<Arc<RankedShard>>>)>>,
}

impl ShardMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, shard: Arc<RankedShard>) {
        self.inner.write().insert(shard.key.clone(), shard);
        self.bump();
    }

    pub fn remove(&self, key: &str) -> Option<Arc<RankedShard>> {
        let removed = self.inner.write().remove(key);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<Arc<RankedShard>> {
        self.inner.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the entire mapping in one step (spec.md §4.6 "exclusive
    /// mode... replace the mapping and bump a generation counter"). Callers
    /// are expected to hold an exclusive scheduler permit first, so no
    /// search is concurrently reading the old mapping.
    pub fn replace_all(&self, shards: Vec<Arc<RankedShard>>) {
        let mut map = HashMap::with_capacity(shards.len());
        for shard in shards {
            map.insert(shard.key.clone(), shard);
        }
        *self.inner.write() = map;
        self.bump();
    }

    fn bump(&self) {
        self.generation.fetch_add(1, AtomicOrdering::SeqCst);
    }

    /// Shards ordered by descending priority, secondary sort ascending by
    /// first-repo name (spec.md §4.6). Recomputed only when `generation`
    /// has moved since the cached copy was built.
    pub fn sorted(&self) -> Arc<Vec<Arc<RankedShard>>> {
        let generation = self.generation.load(AtomicOrdering::SeqCst);
        let mut cache = self.sort_cache.lock();
        if let Some((gen, sorted)) = cache.as_ref() {
            if *gen == generation {
                return sorted.clone();
            }
        }
        let mut shards: Vec<Arc<RankedShard>> = self.inner.read().values().cloned().collect();
        shards.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.first_repo_name.cmp(&b.first_repo_name))
        });
        let sorted = Arc::new(shards);
        *cache = Some((generation, sorted.clone()));
        sorted
    }
}
