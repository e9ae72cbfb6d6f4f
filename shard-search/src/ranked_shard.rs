//! `RankedShard` (spec.md §4.6): "shard key -> { searcher, priority, repo
//! list }", with the priority and repo membership precomputed at load time
//! so the scheduler's sort cache and `select_repo_set` pre-filter never
//! have to walk a shard's repository list per query.

use query_cache::DocMatchTreeCache;
use shard_format::IndexData;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct RankedShard {
    pub key: String,
    pub data: Arc<IndexData>,
    /// Taken from the first repository's `raw_config["priority"]`
    /// (spec.md §4.6: "priority is taken from the shard's repository
    /// raw_config... default 0"), represented directly as `Repository::priority`.
    pub priority: f64,
    pub first_repo_name: String,
    pub repo_names: Vec<String>,
    pub repo_ids: BTreeSet<u32>,
    /// This shard's `docMatchTree` cache for `Meta` leaves (spec.md §4.3,
    /// §6), one per loaded shard so entries never need a shard-identifying
    /// key alongside `(field, checksum(regex))`.
    pub doc_match_tree_cache: DocMatchTreeCache,
}

impl RankedShard {
    pub fn new(key: impl Into<String>, data: Arc<IndexData>) -> Self {
        Self::with_cache_capacity(key, data, None)
    }

    /// Like [`RankedShard::new`], but `cache_capacity` overrides the
    /// `ZOEKT_DOCMATCHTREE_CACHE` env var this shard's own
    /// `DocMatchTreeCache` would otherwise read, letting the scheduler's
    /// configured capacity take precedence.
    pub fn with_cache_capacity(key: impl Into<String>, data: Arc<IndexData>, cache_capacity: Option<usize>) -> Self {
        let repos = &data.content.repositories;
        let priority = repos.first().map(|r| r.priority).unwrap_or(0.0);
        let first_repo_name = repos.first().map(|r| r.name.clone()).unwrap_or_default();
        let repo_names = repos
            .iter()
            .filter(|r| !r.tombstone)
            .map(|r| r.name.clone())
            .collect();
        let repo_ids = repos
            .iter()
            .filter(|r| !r.tombstone)
            .map(|r| r.id)
            .collect();
        Self {
            key: key.into(),
            data,
            priority,
            first_repo_name,
            repo_names,
            repo_ids,
            doc_match_tree_cache: cache_capacity
                .map(DocMatchTreeCache::new)
                .unwrap_or_else(DocMatchTreeCache::from_env),
        }
    }
}
