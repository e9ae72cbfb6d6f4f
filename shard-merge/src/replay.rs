//! Reconstructs a `shard_format::Document` from a loaded shard's per-doc
//! arrays (spec.md §4.7: "replay each document ... via the normal builder
//! add"), used by both [`crate::merge`] and [`crate::explode`] so neither
//! has to special-case skipped vs. ordinary documents differently.

use shard_format::{Document, Repository, ShardContent};

pub fn reconstruct_document(shard: &ShardContent, repo: &Repository, doc: u32) -> Document {
    let name = shard.doc_names[doc as usize].clone();
    let content = shard.doc_content(doc).to_vec();
    let branches = repo.decode_branch_mask(shard.branch_masks[doc as usize]);
    let mut document = Document::new(name, content).with_branches(branches);
    document.sub_repository_path = shard.sub_repo_index[doc as usize].clone();
    document.language = shard.language_codes[doc as usize].clone();
    document.category = shard.categories[doc as usize];
    document.symbols = shard.symbol_sections[doc as usize].clone();
    document
}
