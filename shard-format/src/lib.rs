//! Shard binary format: on-disk layout, the decoded in-memory representation
//! (`IndexData`), and the document/repository/trigram types shared by
//! `shard-builder`, `match-engine`, and `shard-merge` (spec.md §3, §6).

pub mod document;
pub mod error;
pub mod index_data;
pub mod naming;
pub mod repository;
pub mod runeoffset;
pub mod toc;
pub mod trigram;

pub use document::{Document, DocumentCategory, SkipReason, SymbolSection};
pub use error::{Result, ShardError};
pub use index_data::{decode_shard_content, write_shard_content, IndexData, ShardContent};
pub use naming::{
    compound_shard_name, simple_shard_name, simple_shard_name_for_repo, tenant_enforced,
    ENV_WORKSPACES_API_URL, FORMAT_VERSION_V16, FORMAT_VERSION_V17,
};
pub use repository::{Branch, RawConfig, Repository, MAX_BRANCHES};
pub use runeoffset::RuneOffsetTable;
pub use toc::{Footer, Toc, TocEntry, TocWriter};
pub use trigram::{
    intersect_aligned, rune_count, trigram_count, trigrams, Candidate, Posting, PostingList,
    TrigramIndex, TrigramKey,
};
