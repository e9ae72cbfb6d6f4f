//! Sharded searcher and scheduler (spec.md §4.6): the priority-ranked shard
//! map, the `select_repo_set` pre-filter, the interactive/batch weighted
//! semaphores, and the feeder/worker fan-out that backs `search`,
//! `stream_search`, `list`, and `close`.
//!
//! Each loaded shard owns its own `query_cache::DocMatchTreeCache`
//! (`RankedShard::doc_match_tree_cache`), which `match-engine`'s `Meta` leaf
//! consults during `compile` so a repeated `Meta` pattern isn't rescanned on
//! every search against that shard. `Scheduler::with_cache_capacity` lets an
//! embedder's `Config` override the `ZOEKT_DOCMATCHTREE_CACHE` env var every
//! shard's cache would otherwise read.

mod error;
mod fanout;
mod ranked_shard;
mod scheduler;
mod select_repo_set;
mod semaphore;
mod shard_map;
mod types;

pub use error::{Result, SearchError};
pub use fanout::{fan_out, ShardEvent};
pub use ranked_shard::RankedShard;
pub use scheduler::Scheduler;
pub use select_repo_set::select_repo_set;
pub use semaphore::{SemaphorePermit, WeightedSemaphore};
pub use shard_map::ShardMap;
pub use types::{FlushReason, RepoInfo, SearchOptions, SearchResult, SearchStats, StreamEvent};

#[cfg(test)]
mod tests {
    use super::*;
    use shard_format::{Document, IndexData, Repository, ShardContent};
    use std::fs;
    use std::sync::Arc;

    fn write_shard(dir: &std::path::Path, key: &str, priority: f64, files: &[(&str, &str)]) -> Arc<IndexData> {
        let mut repo = Repository::new(0, key);
        repo.priority = priority;
        repo.add_branch("main", "v1");
        let mut content = ShardContent::default();
        content.repositories.push(repo.clone());
        for (name, text) in files {
            let doc = Document::new(*name, text.as_bytes().to_vec()).with_branches(["main".to_string()]);
            let mask = repo.encode_branch_mask(&doc.branches);
            content.push_document(0, mask, &doc);
        }
        let bytes = shard_format::write_shard_content(&content, shard_format::FORMAT_VERSION_V17).unwrap();
        let path = dir.join(format!("{key}.zoekt"));
        fs::write(&path, &bytes).unwrap();
        Arc::new(IndexData::open(&path).unwrap())
    }

    #[test]
    fn search_aggregates_across_shards() {
        let dir = tempdir::TempDir::new("scheduler-test").unwrap();
        let scheduler = Scheduler::new(4);
        scheduler.load_shard("a", write_shard(dir.path(), "a", 0.9, &[("x.rs", "needle here")]));
        scheduler.load_shard("b", write_shard(dir.path(), "b", 0.1, &[("y.rs", "no match")]));

        let query = query_lang::Q::substring("needle", true);
        let result = scheduler.search(query, &SearchOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.stats.shards_scanned, 2);
        assert_eq!(result.stats.crashes, 0);
    }

    #[test]
    fn close_empties_the_shard_map() {
        let dir = tempdir::TempDir::new("scheduler-close-test").unwrap();
        let scheduler = Scheduler::new(2);
        scheduler.load_shard("a", write_shard(dir.path(), "a", 0.5, &[("x.rs", "hi")]));
        assert_eq!(scheduler.shard_count(), 1);
        scheduler.close();
        assert_eq!(scheduler.shard_count(), 0);
    }

    #[test]
    fn list_dedupes_repos_by_name() {
        let dir = tempdir::TempDir::new("scheduler-list-test").unwrap();
        let scheduler = Scheduler::new(2);
        scheduler.load_shard("a", write_shard(dir.path(), "repoA", 0.5, &[("x.rs", "hi")]));
        let repos = scheduler.list(query_lang::Q::Const(true));
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "repoA");
    }
}
