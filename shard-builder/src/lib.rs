//! Builds shard files from a stream of documents (spec.md §4.1 "Shard
//! builder"): skip detection, trigram indexing, branch mask encoding,
//! within-shard ranking, rollover at a byte budget, and an atomic write.

use shard_format::{
    compound_shard_name, simple_shard_name_for_repo, write_shard_content, Document,
    DocumentCategory, Repository, ShardContent, SkipReason, FORMAT_VERSION_V17,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Shard(#[from] shard_format::ShardError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Thresholds the builder applies before a document is allowed to
/// contribute content (spec.md §4.1 item 1: "applies size/binary/trigram
/// ceilings before indexing").
#[derive(Debug, Clone)]
pub struct ShardBuilderOptions {
    /// Documents larger than this are skipped as [`SkipReason::TooLarge`].
    pub max_file_bytes: usize,
    /// Zero-byte documents are skipped as [`SkipReason::TooSmall`].
    pub min_file_bytes: usize,
    /// A document whose trigram count would exceed this is skipped as
    /// [`SkipReason::TooManyTrigrams`] rather than indexed partially.
    pub max_trigrams_per_doc: usize,
    /// Target uncompressed content size before the builder rolls over to a
    /// new shard file (spec.md §3: "shards roll over at a byte budget").
    pub shard_max_bytes: u64,
    pub format_version: u32,
}

impl Default for ShardBuilderOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 << 20,
            min_file_bytes: 1,
            max_trigrams_per_doc: 100_000,
            shard_max_bytes: 100 << 20,
            format_version: FORMAT_VERSION_V17,
        }
    }
}

/// A raw file handed to the builder before skip detection runs.
pub struct RawFile {
    pub name: String,
    pub content: Vec<u8>,
    pub branches: Vec<String>,
    pub sub_repository_path: String,
    pub language: String,
    pub category: DocumentCategory,
    pub symbols: Vec<shard_format::SymbolSection>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
            branches: Vec::new(),
            sub_repository_path: String::new(),
            language: String::new(),
            category: DocumentCategory::Normal,
            symbols: Vec::new(),
        }
    }

    pub fn with_branches(mut self, branches: impl IntoIterator<Item = String>) -> Self {
        self.branches = branches.into_iter().collect();
        self
    }
}

/// First 8 KiB is scanned for a NUL byte, matching the cheap heuristic most
/// code search indexers use to reject binary files without decoding them.
fn looks_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

fn classify(content: &[u8], opts: &ShardBuilderOptions) -> Option<SkipReason> {
    if content.len() < opts.min_file_bytes {
        return Some(SkipReason::TooSmall);
    }
    if content.len() > opts.max_file_bytes {
        return Some(SkipReason::TooLarge);
    }
    if looks_binary(content) {
        return Some(SkipReason::Binary);
    }
    let text = String::from_utf8_lossy(content);
    if shard_format::trigram_count(&text) > opts.max_trigrams_per_doc {
        return Some(SkipReason::TooManyTrigrams);
    }
    None
}

/// One not-yet-committed file, held back so the builder can rank an entire
/// shard's worth of documents before writing any of them in.
struct PendingFile {
    file: RawFile,
    skip: Option<SkipReason>,
}

/// Sort key for within-shard document ranking (spec.md §4.1 item 5: "prefer
/// shorter names, penalize test/generated/vendored categories and skipped
/// documents"). Ascending order puts normal, short-named documents first and
/// skipped documents last.
fn rank_key(pending: &PendingFile) -> (u8, u8, usize, &str) {
    let skipped_rank = u8::from(pending.skip.is_some());
    let category_rank = u8::from(pending.file.category != DocumentCategory::Normal);
    (skipped_rank, category_rank, pending.file.name.len(), pending.file.name.as_str())
}

/// Accumulates documents for a single repository into one or more shards,
/// handing off to a fresh [`ShardContent`] whenever `shard_max_bytes` would
/// be exceeded. Files are held in `pending` (not yet assigned a doc id) so
/// the whole shard can be ranked before any document is committed.
pub struct ShardBuilder {
    opts: ShardBuilderOptions,
    repository: Repository,
    pending: Vec<PendingFile>,
    pending_bytes: u64,
    finished: Vec<ShardContent>,
}

impl ShardBuilder {
    pub fn new(repository: Repository, opts: ShardBuilderOptions) -> Self {
        Self {
            opts,
            repository,
            pending: Vec::new(),
            pending_bytes: 0,
            finished: Vec::new(),
        }
    }

    /// Runs skip detection and buffers the file (rolling the in-progress
    /// shard over first if accepting it would overflow the budget).
    pub fn add_file(&mut self, file: RawFile) {
        let skip = classify(&file.content, &self.opts);
        if let Some(reason) = skip {
            warn!(name = %file.name, ?reason, "skipping document");
        } else if self.pending_bytes + file.content.len() as u64 > self.opts.shard_max_bytes
            && !self.pending.is_empty()
        {
            self.roll_over();
        }
        if skip.is_none() {
            self.pending_bytes += file.content.len() as u64;
        }
        self.pending.push(PendingFile { file, skip });
    }

    fn roll_over(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.pending_bytes = 0;
        let shard = self.build_shard(pending);
        info!(docs = shard.doc_count(), "rolling shard over");
        self.finished.push(shard);
    }

    /// Flushes the in-progress shard and returns every completed
    /// [`ShardContent`] for this repository, in order.
    pub fn finish(mut self) -> Vec<ShardContent> {
        if !self.pending.is_empty() || self.finished.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            let shard = self.build_shard(pending);
            self.finished.push(shard);
        }
        self.finished
    }

    /// Ranks `pending` and commits it into a fresh [`ShardContent`] in
    /// ranked order.
    fn build_shard(&self, mut pending: Vec<PendingFile>) -> ShardContent {
        pending.sort_by(|a, b| rank_key(a).cmp(&rank_key(b)));
        let mut content = ShardContent::default();
        content.repositories.push(self.repository.clone());
        for PendingFile { file, skip } in pending {
            if skip.is_some() {
                content.push_skipped(self.repository.id, &file.name);
                continue;
            }
            let mask = self.repository.encode_branch_mask(&file.branches);
            let doc = Document::new(file.name, file.content)
                .with_branches(file.branches)
                .with_category(file.category);
            let mut doc = doc.with_language(file.language);
            doc.sub_repository_path = file.sub_repository_path;
            doc.symbols = file.symbols;
            content.push_document(self.repository.id, mask, &doc);
        }
        content
    }
}

/// Writes one shard's content to `dir` using the deterministic naming
/// scheme, via a temp file plus atomic rename (grounded on the teacher's
/// `persistent.rs` write-then-rename pattern, adapted to the TOC format).
pub fn write_shard_file(
    dir: &Path,
    content: &ShardContent,
    version: u32,
    shard_index: u32,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = if content.repositories.len() == 1 {
        simple_shard_name_for_repo(&content.repositories[0], version, shard_index)
    } else {
        let names: Vec<String> = content
            .repositories
            .iter()
            .filter(|r| !r.tombstone)
            .map(|r| r.name.clone())
            .collect();
        compound_shard_name(&names, version, shard_index)
    };
    let final_path = dir.join(&name);
    let tmp_path = dir.join(format!("{name}.tmp"));
    let bytes = write_shard_content(content, version)?;
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(&bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp_path, &final_path)?;
    info!(path = %final_path.display(), bytes = bytes.len(), "wrote shard");
    Ok(final_path)
}
