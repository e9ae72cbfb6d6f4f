//! Facade configuration (spec.md §6.1 "new: Configuration"): a small
//! `serde`-derived struct loaded from an optional TOML file, with the two
//! environment variables spec.md §6 documents layered on top. No config
//! framework crate — matches the teacher's preference for plain
//! `serde`-derived structs over a dedicated `config`/`figment` dependency.

use serde::Deserialize;
use shard_search::SearchOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `ZOEKT_DOCMATCHTREE_CACHE` (spec.md §6): LRU capacity for the
/// docMatchTree cache, read again here only so `Config` can report the
/// effective value; `query_cache::DocMatchTreeCache::from_env` is what
/// actually governs the cache.
pub const ENV_DOCMATCHTREE_CACHE: &str = "ZOEKT_DOCMATCHTREE_CACHE";

/// Non-empty flips shard naming to id-prefixed (spec.md §6); reading the
/// flag is the facade's job, applying it is `shard-format::naming`'s.
pub const ENV_WORKSPACES_API_URL: &str = "WORKSPACES_API_URL";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for `*.zoekt` shard files at startup and on reload.
    pub shard_dir: PathBuf,
    /// Number of worker threads the scheduler dispatches shards across;
    /// `None` defaults to the host's available parallelism.
    pub cores: Option<usize>,
    /// Default `shard_max_bytes` handed to a `shard_builder::Builder`
    /// constructed by an embedder; `None` keeps
    /// `ShardBuilderOptions::default()`'s value.
    pub shard_max_bytes: Option<u64>,
    /// docMatchTree cache capacity, overriding `ZOEKT_DOCMATCHTREE_CACHE`
    /// when set from the TOML file rather than the environment.
    pub docmatchtree_cache_capacity: Option<usize>,
    pub default_options: RawOptions,
}

/// Mirrors `shard_search::SearchOptions`, but durations are plain seconds
/// so the struct can derive `Deserialize` directly from TOML without a
/// humantime dependency the teacher doesn't already carry.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOptions {
    pub max_wall_time_secs: Option<u64>,
    pub total_max_match_count: Option<usize>,
    pub max_doc_display_count: Option<usize>,
    pub max_match_display_count: Option<usize>,
    pub shard_repo_max_match_count: Option<usize>,
    pub flush_wall_time_secs: Option<u64>,
    pub max_size_bytes: Option<usize>,
    pub use_bm25_scoring: bool,
    pub use_document_ranks: bool,
}

impl RawOptions {
    pub fn into_options(self) -> SearchOptions {
        SearchOptions {
            max_wall_time: self.max_wall_time_secs.map(Duration::from_secs),
            total_max_match_count: self.total_max_match_count,
            max_doc_display_count: self.max_doc_display_count,
            max_match_display_count: self.max_match_display_count,
            shard_repo_max_match_count: self.shard_repo_max_match_count,
            flush_wall_time: self.flush_wall_time_secs.map(Duration::from_secs),
            max_size_bytes: self.max_size_bytes,
            use_bm25_scoring: self.use_bm25_scoring,
            use_document_ranks: self.use_document_ranks,
            debug_score: false,
            trace: false,
        }
    }
}

impl Config {
    /// Loads `path` as TOML if it exists, falling back to defaults
    /// otherwise; `shard_dir` still needs to be set by the caller when no
    /// file is present.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn with_shard_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shard_dir = dir.into();
        self
    }

    /// True if `WORKSPACES_API_URL` is set to anything non-empty (spec.md
    /// §6: "non-empty flips shard naming to id-prefixed"). Delegates to
    /// `shard_format::naming`, the crate that actually applies the flag, so
    /// there's a single source of truth for the env var.
    pub fn tenant_enforced() -> bool {
        shard_format::tenant_enforced()
    }

    pub fn docmatchtree_cache_capacity_from_env() -> Option<usize> {
        std::env::var(ENV_DOCMATCHTREE_CACHE).ok()?.parse().ok()
    }

    /// This config's override, if set, else whatever
    /// `ZOEKT_DOCMATCHTREE_CACHE` names.
    pub fn effective_docmatchtree_cache_capacity(&self) -> Option<usize> {
        self.docmatchtree_cache_capacity
            .or_else(Self::docmatchtree_cache_capacity_from_env)
    }

    /// `shard_builder::ShardBuilderOptions` with `shard_max_bytes`
    /// overridden from this config, for embedders that both build and
    /// serve shards through one `Config`.
    pub fn builder_options(&self) -> shard_builder::ShardBuilderOptions {
        let mut opts = shard_builder::ShardBuilderOptions::default();
        if let Some(max) = self.shard_max_bytes {
            opts.shard_max_bytes = max;
        }
        opts
    }
}
