//! Search fan-out (spec.md §4.6): "launch a feeder that yields shards in
//! descending priority to a bounded channel; launch N worker tasks that
//! drain the channel." Grounded on the teacher's `processor.rs` channel
//! plumbing (`crossbeam::channel`, a bounded queue drained by a worker
//! loop), generalized from one FS-event queue to N per-shard search tasks.

use crate::error::SearchError;
use crate::ranked_shard::RankedShard;
use crossbeam_channel::{bounded, unbounded, Receiver};
use match_engine::ShardMatch;
use parking_lot::Mutex;
use query_lang::Q;
use search_cancel::CancellationToken;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::warn;

/// One shard's contribution, tagged with the scheduling progress spec.md
/// §4.6 requires: "progress = { priority, max_pending_priority }".
pub struct ShardEvent {
    pub shard_key: String,
    pub priority: f64,
    /// Highest priority among shards not yet reported as done. Monotonically
    /// non-increasing across the events of one search (spec.md §8 invariant 7).
    pub max_pending_priority: f64,
    pub outcome: Result<Vec<ShardMatch>, SearchError>,
}

struct Pending {
    remaining: Vec<f64>,
}

impl Pending {
    fn max(&self) -> f64 {
        self.remaining
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Fans `query` out across `shards` (already sorted descending by
/// priority). A feeder thread enqueues shard indices into a bounded
/// channel; `workers` worker threads drain it, compiling and running the
/// query per shard. Per-shard panics are caught (spec.md §4.6/§7 "Crash...
/// isolated per shard") rather than unwinding the worker thread.
pub fn fan_out(
    shards: Arc<Vec<Arc<RankedShard>>>,
    query: Arc<Q>,
    cancel: CancellationToken,
    workers: usize,
) -> Receiver<ShardEvent> {
    let workers = workers.max(1);
    let (work_tx, work_rx) = bounded::<usize>(workers * 4);
    let (event_tx, event_rx) = unbounded::<ShardEvent>();

    let pending = Arc::new(Mutex::new(Pending {
        remaining: shards.iter().map(|s| s.priority).collect(),
    }));

    {
        let shards = Arc::clone(&shards);
        thread::spawn(move || {
            for idx in 0..shards.len() {
                if cancel.check().is_err() {
                    break;
                }
                if work_tx.send(idx).is_err() {
                    break;
                }
            }
        });
    }

    for _ in 0..workers {
        let work_rx = work_rx.clone();
        let event_tx = event_tx.clone();
        let shards = Arc::clone(&shards);
        let query = Arc::clone(&query);
        let pending = Arc::clone(&pending);
        thread::spawn(move || {
            while let Ok(idx) = work_rx.recv() {
                let shard = &shards[idx];
                if cancel.check().is_err() {
                    break;
                }
                let outcome = run_one_shard(shard, &query, &cancel);

                // max_pending_priority must be computed and forwarded under
                // the same lock guarding the pending list (spec.md §4.6), so
                // a consumer seeing max_pending_priority < p can be sure no
                // later event for a shard with priority >= p is still in flight.
                let mut state = pending.lock();
                if let Some(pos) = state.remaining.iter().position(|p| *p == shard.priority) {
                    state.remaining.swap_remove(pos);
                }
                let event = ShardEvent {
                    shard_key: shard.key.clone(),
                    priority: shard.priority,
                    max_pending_priority: state.max(),
                    outcome,
                };
                let _ = event_tx.send(event);
                drop(state);
            }
        });
    }

    event_rx
}

fn run_one_shard(
    shard: &RankedShard,
    query: &Q,
    cancel: &CancellationToken,
) -> Result<Vec<ShardMatch>, SearchError> {
    let content = &shard.data.content;
    match catch_unwind(AssertUnwindSafe(|| {
        let matcher = match_engine::compile(query, content, &shard.doc_match_tree_cache)?;
        match_engine::search_shard(&matcher, content, cancel)
    })) {
        Ok(Ok(matches)) => Ok(matches),
        Ok(Err(err)) => Err(SearchError::from(err)),
        Err(_) => {
            warn!(shard = %shard.key, "panic during shard search");
            Err(SearchError::Crash(shard.key.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_format::{Document, IndexData, Repository, ShardContent};
    use std::fs;

    fn shard(dir: &std::path::Path, key: &str, priority: f64, text: &str) -> Arc<RankedShard> {
        let mut repo = Repository::new(0, key);
        repo.priority = priority;
        repo.add_branch("main", "v1");
        let mut content = ShardContent::default();
        content.repositories.push(repo.clone());
        let doc = Document::new("f.rs", text.as_bytes().to_vec()).with_branches(["main".to_string()]);
        let mask = repo.encode_branch_mask(&doc.branches);
        content.push_document(0, mask, &doc);
        let bytes = shard_format::write_shard_content(&content, shard_format::FORMAT_VERSION_V17).unwrap();
        let path = dir.join(format!("{key}.zoekt"));
        fs::write(&path, &bytes).unwrap();
        Arc::new(RankedShard::new(key, Arc::new(IndexData::open(&path).unwrap())))
    }

    #[test]
    fn fan_out_reports_monotonic_max_pending_priority() {
        let dir = tempdir::TempDir::new("fanout-test").unwrap();
        let shards = Arc::new(vec![
            shard(dir.path(), "a", 0.9, "needle"),
            shard(dir.path(), "b", 0.5, "needle"),
            shard(dir.path(), "c", 0.1, "needle"),
        ]);
        let query = Arc::new(query_lang::simplify(Q::substring("needle", true)));
        let cancel = CancellationToken::new(1);
        let events = fan_out(shards, query, cancel, 2);

        let mut last_max = f64::INFINITY;
        let mut seen = 0;
        for event in events.iter() {
            assert!(event.max_pending_priority <= last_max);
            last_max = event.max_pending_priority;
            assert!(event.outcome.is_ok());
            seen += 1;
        }
        assert_eq!(seen, 3);
    }
}
