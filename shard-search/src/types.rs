//! Request options and result types for the scheduler's public API
//! (spec.md §6 "Options"): everything a caller can tune on a single search.

use ranking::ScoredFile;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub max_wall_time: Option<Duration>,
    pub total_max_match_count: Option<usize>,
    pub max_doc_display_count: Option<usize>,
    pub max_match_display_count: Option<usize>,
    pub shard_repo_max_match_count: Option<usize>,
    pub flush_wall_time: Option<Duration>,
    pub max_size_bytes: Option<usize>,
    pub use_bm25_scoring: bool,
    pub use_document_ranks: bool,
    pub debug_score: bool,
    pub trace: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub crashes: usize,
    pub shards_scanned: usize,
    pub duration: Duration,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub files: Vec<ScoredFile>,
    pub stats: SearchStats,
}

/// Why a `stream_search` call forwarded a partial batch (spec.md §4.6
/// "Collect-and-flush... reason for flush is observable").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    TimerExpired,
    MaxSizeReached,
    FinalFlush,
}

#[derive(Debug, Clone)]
pub enum StreamEvent {
    Partial {
        files: Vec<ScoredFile>,
        reason: FlushReason,
    },
    ShardCrashed {
        shard_key: String,
    },
    Done(SearchStats),
}

/// One repository as returned by `list` (spec.md §6 "list(ctx, query,
/// list_options) -> RepoList").
#[derive(Debug, Clone, PartialEq)]
pub struct RepoInfo {
    pub name: String,
    pub priority: f64,
    pub rank: u16,
    pub branches: Vec<String>,
}
