//! Ties the shard map, the interactive/batch semaphores, and the fan-out
//! driver into the `search`/`stream_search`/`list`/`close` surface spec.md
//! §6 names as the scheduler's abstract API.

use crate::error::SearchError;
use crate::fanout::fan_out;
use crate::ranked_shard::RankedShard;
use crate::select_repo_set::select_repo_set;
use crate::semaphore::WeightedSemaphore;
use crate::shard_map::ShardMap;
use crate::types::{FlushReason, RepoInfo, SearchOptions, SearchResult, SearchStats, StreamEvent};
use crossbeam_channel::Sender;
use query_lang::Q;
use ranking::Weights;
use search_cancel::CancellationToken;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One crude estimate of a scored file's contribution to `max_size_bytes`:
/// spec.md doesn't pin down a unit, so this counts each kept line as a
/// fixed-width slot, which is enough to make the flush threshold meaningful
/// without threading exact byte counts through `ranking`.
const APPROX_BYTES_PER_LINE: usize = 96;

pub struct Scheduler {
    shards: ShardMap,
    interactive: WeightedSemaphore,
    batch: WeightedSemaphore,
    /// Overrides the `ZOEKT_DOCMATCHTREE_CACHE` env var each loaded shard's
    /// own `DocMatchTreeCache` would otherwise read (spec.md §4.3, §6),
    /// letting an embedder's `Config` take precedence. `None` means every
    /// shard reads the env var itself.
    cache_capacity: Option<usize>,
    search_version: AtomicU64,
}

impl Scheduler {
    /// `cores` sizes the interactive semaphore to `GOMAXPROCS`/CPU count
    /// (spec.md §4.6); the batch semaphore (entered after a co-operative
    /// downgrade) gets half that, rounded up.
    pub fn new(cores: usize) -> Self {
        Self::with_cache_capacity(cores, None)
    }

    /// Like [`Scheduler::new`], but `cache_capacity` overrides the
    /// `ZOEKT_DOCMATCHTREE_CACHE` env var each shard's own
    /// `query_cache::DocMatchTreeCache` would otherwise read.
    pub fn with_cache_capacity(cores: usize, cache_capacity: Option<usize>) -> Self {
        let cores = cores.max(1);
        Self {
            shards: ShardMap::new(),
            interactive: WeightedSemaphore::new(cores as u32),
            batch: WeightedSemaphore::new(cores.div_ceil(2) as u32),
            cache_capacity,
            search_version: AtomicU64::new(0),
        }
    }

    pub fn cache_capacity(&self) -> Option<usize> {
        self.cache_capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn load_shard(&self, key: impl Into<String>, data: Arc<shard_format::IndexData>) {
        self.shards
            .insert(Arc::new(RankedShard::with_cache_capacity(key, data, self.cache_capacity)));
    }

    /// Exclusive mode (spec.md §4.6): acquires full weight on both
    /// semaphores so no interactive or batch search can be running, then
    /// replaces the mapping and bumps the sort-cache generation.
    pub fn reload(&self, shards: Vec<(String, Arc<shard_format::IndexData>)>) {
        let _interactive = self.interactive.acquire_exclusive(None);
        let _batch = self.batch.acquire_exclusive(None);
        let ranked = shards
            .into_iter()
            .map(|(key, data)| Arc::new(RankedShard::with_cache_capacity(key, data, self.cache_capacity)))
            .collect();
        self.shards.replace_all(ranked);
        info!(shards = self.shards.len(), "scheduler reload complete");
    }

    pub fn close(&self) {
        let _interactive = self.interactive.acquire_exclusive(None);
        let _batch = self.batch.acquire_exclusive(None);
        self.shards.replace_all(Vec::new());
        info!("scheduler closed");
    }

    fn prepare(&self, query: Q) -> (Arc<Q>, Arc<Vec<Arc<RankedShard>>>) {
        let query = query_lang::simplify(query);
        let all_shards = self.shards.sorted();
        let (query, shards) = select_repo_set(query, (*all_shards).clone());
        (Arc::new(query), Arc::new(shards))
    }

    fn next_cancel_token(&self, max_wall_time: Option<std::time::Duration>) -> CancellationToken {
        let version = self.search_version.fetch_add(1, Ordering::SeqCst) + 1;
        match max_wall_time {
            Some(d) => CancellationToken::with_deadline(version, d),
            None => CancellationToken::new(version),
        }
    }

    /// Aggregates every shard's contribution into one sorted, truncated
    /// `SearchResult` (spec.md §6 `search(ctx, query, options)`).
    pub fn search(&self, query: Q, options: &SearchOptions) -> SearchResult {
        let started = Instant::now();
        let cancel = self.next_cancel_token(options.max_wall_time);
        let deadline = options.max_wall_time.map(|d| started + d);

        let Some(permit) = self.interactive.acquire(1, deadline) else {
            warn!("search dropped: no scheduler permit before deadline");
            return SearchResult {
                files: Vec::new(),
                stats: SearchStats {
                    duration: started.elapsed(),
                    cancelled: true,
                    ..Default::default()
                },
            };
        };

        let (query, shards) = self.prepare(query);
        let by_key: HashMap<&str, &Arc<RankedShard>> =
            shards.iter().map(|s| (s.key.as_str(), s)).collect();
        let cores = self.interactive.capacity() as usize;
        let events = fan_out(Arc::clone(&shards), query, cancel, cores);

        let weights = Weights::default();
        let mut files = Vec::new();
        let mut stats = SearchStats::default();
        let mut visible_matches = 0usize;

        for event in events.iter() {
            stats.shards_scanned += 1;
            match event.outcome {
                Ok(ref matches) => {
                    if let Some(shard) = by_key.get(event.shard_key.as_str()) {
                        for (file_order, m) in matches.iter().enumerate() {
                            let scored =
                                ranking::score_shard_match(&weights, &shard.data.content, m, 1, file_order);
                            visible_matches += scored.matches.lines.len().max(1);
                            files.push(scored);
                        }
                    }
                }
                Err(SearchError::Crash(_)) => stats.crashes += 1,
                Err(_) => stats.cancelled = true,
            }
            if let Some(max) = options.total_max_match_count {
                if visible_matches >= max {
                    // Cancels this search (and any other interactive search
                    // still in flight, per search-cancel's global "newest
                    // search wins" contract) so the feeder and remaining
                    // workers stop dispatching further shards.
                    CancellationToken::new(self.search_version.fetch_add(1, Ordering::SeqCst) + 1);
                    stats.cancelled = true;
                }
            }
        }

        drop(permit);
        stats.duration = started.elapsed();
        debug!(files = files.len(), ?stats, "search complete");

        let files = ranking::truncate(
            ranking::sort_files(files),
            options.max_doc_display_count,
            options.max_match_display_count,
        );
        SearchResult { files, stats }
    }

    /// Streams partial, sorted batches to `sender` as they cross
    /// `flush_wall_time`/`max_size_bytes` thresholds (spec.md §4.6
    /// "Collect-and-flush"), followed by a final flush and a `Done` event.
    pub fn stream_search(&self, query: Q, options: &SearchOptions, sender: Sender<StreamEvent>) {
        let started = Instant::now();
        let cancel = self.next_cancel_token(options.max_wall_time);
        let deadline = options.max_wall_time.map(|d| started + d);

        let Some(permit) = self.interactive.acquire(1, deadline) else {
            let _ = sender.send(StreamEvent::Done(SearchStats {
                duration: started.elapsed(),
                cancelled: true,
                ..Default::default()
            }));
            return;
        };

        let (query, shards) = self.prepare(query);
        let by_key: HashMap<&str, &Arc<RankedShard>> =
            shards.iter().map(|s| (s.key.as_str(), s)).collect();
        let cores = self.interactive.capacity() as usize;
        let events = fan_out(Arc::clone(&shards), query, cancel, cores);

        let weights = Weights::default();
        let mut stats = SearchStats::default();
        let mut buffer = Vec::new();
        let mut buffered_bytes = 0usize;
        let mut last_flush = Instant::now();

        for event in events.iter() {
            stats.shards_scanned += 1;
            match event.outcome {
                Ok(ref matches) => {
                    if let Some(shard) = by_key.get(event.shard_key.as_str()) {
                        for (file_order, m) in matches.iter().enumerate() {
                            let scored =
                                ranking::score_shard_match(&weights, &shard.data.content, m, 1, file_order);
                            buffered_bytes += scored.matches.lines.len().max(1) * APPROX_BYTES_PER_LINE;
                            buffer.push(scored);
                        }
                    }
                }
                Err(SearchError::Crash(ref key)) => {
                    stats.crashes += 1;
                    let _ = sender.send(StreamEvent::ShardCrashed {
                        shard_key: key.clone(),
                    });
                }
                Err(_) => stats.cancelled = true,
            }

            let reason = if options.max_size_bytes.is_some_and(|max| buffered_bytes >= max) {
                Some(FlushReason::MaxSizeReached)
            } else if options
                .flush_wall_time
                .is_some_and(|interval| last_flush.elapsed() >= interval)
            {
                Some(FlushReason::TimerExpired)
            } else {
                None
            };

            if let Some(reason) = reason {
                let flushed = ranking::truncate(
                    ranking::sort_files(std::mem::take(&mut buffer)),
                    options.max_doc_display_count,
                    options.max_match_display_count,
                );
                buffered_bytes = 0;
                last_flush = Instant::now();
                let _ = sender.send(StreamEvent::Partial {
                    files: flushed,
                    reason,
                });
            }
        }

        drop(permit);
        if !buffer.is_empty() {
            let flushed = ranking::truncate(
                ranking::sort_files(buffer),
                options.max_doc_display_count,
                options.max_match_display_count,
            );
            let _ = sender.send(StreamEvent::Partial {
                files: flushed,
                reason: FlushReason::FinalFlush,
            });
        }

        stats.duration = started.elapsed();
        let _ = sender.send(StreamEvent::Done(stats));
    }

    /// Lists distinct repositories visible to `query` (spec.md §6
    /// `list(ctx, query, list_options) -> RepoList`), applying the same
    /// repo-set pre-filter a search would.
    pub fn list(&self, query: Q) -> Vec<RepoInfo> {
        let (_, shards) = self.prepare(query);
        let mut seen = std::collections::BTreeSet::new();
        let mut repos = Vec::new();
        for shard in shards.iter() {
            for repo in &shard.data.content.repositories {
                if repo.tombstone || !seen.insert(repo.name.clone()) {
                    continue;
                }
                repos.push(RepoInfo {
                    name: repo.name.clone(),
                    priority: repo.priority,
                    rank: repo.rank,
                    branches: repo.branches.iter().map(|b| b.name.clone()).collect(),
                });
            }
        }
        repos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_cache_capacity_overrides_env() {
        let scheduler = Scheduler::with_cache_capacity(2, Some(7));
        assert_eq!(scheduler.cache_capacity(), Some(7));
    }
}
