//! The in-memory view a shard is decoded into (spec.md §3 "Shard (index
//! data)"). [`IndexData`] owns the memory-mapped bytes and the decoded
//! per-section structures the match-tree compiler and evaluator read.

use crate::document::{Document, DocumentCategory, SymbolSection};
use crate::error::{Result, ShardError};
use crate::repository::Repository;
use crate::runeoffset::RuneOffsetTable;
use crate::toc::{self, Toc, TocWriter};
use crate::trigram::TrigramIndex;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Everything a shard stores, in decoded (owned) form. This is what the
/// builder assembles in memory and what the reader decodes a shard file
/// into; it is the serializable payload behind each TOC section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardContent {
    pub repositories: Vec<Repository>,
    /// File name per document, insertion order.
    pub doc_names: Vec<String>,
    /// Concatenated content of every non-skipped document.
    pub content: Vec<u8>,
    /// `boundaries[i]` = cumulative content length through doc `i - 1`;
    /// `boundaries.len() == doc_count + 1`.
    pub boundaries: Vec<u64>,
    pub branch_masks: Vec<u64>,
    /// Repository id per document; non-decreasing (spec.md §3 invariant).
    pub repo_index: Vec<u32>,
    pub sub_repo_index: Vec<String>,
    pub language_codes: Vec<String>,
    pub categories: Vec<DocumentCategory>,
    pub rune_offsets: Vec<RuneOffsetTable>,
    pub symbol_sections: Vec<Vec<SymbolSection>>,
    /// Whether the document was skipped (spec.md §3: "stored as a
    /// sentinel"); skipped docs have empty content/boundaries contribution.
    pub skipped: Vec<bool>,
    pub trigram_content: TrigramIndex,
    pub trigram_name: TrigramIndex,
    /// Lower-cased twin of `trigram_content`, consulted instead of the
    /// raw-case index when a query's pattern is case-insensitive (spec.md
    /// §3: "a case-folded trigram view"); without it, a lowered query
    /// pattern never finds a posting list keyed by mixed-case trigrams.
    pub trigram_content_fold: TrigramIndex,
    pub trigram_name_fold: TrigramIndex,
}

impl ShardContent {
    pub fn doc_count(&self) -> usize {
        self.doc_names.len()
    }

    pub fn doc_content(&self, doc: u32) -> &[u8] {
        let i = doc as usize;
        let start = self.boundaries[i] as usize;
        let end = self.boundaries[i + 1] as usize;
        &self.content[start..end]
    }

    pub fn repository(&self, id: u32) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.id == id)
    }

    /// Global symbol index where document `doc`'s symbols begin, used to
    /// hydrate a candidate via `fileEndSymbol[doc] + local_section_index`
    /// (spec.md §4.4).
    pub fn symbol_base_index(&self, doc: u32) -> usize {
        self.symbol_sections[..doc as usize]
            .iter()
            .map(|v| v.len())
            .sum()
    }

    /// Appends one already-accepted (non-skipped) document's data and
    /// returns its assigned doc id. Trigram postings are indexed for both
    /// content and file name. Called by `shard-builder`.
    pub fn push_document(&mut self, repo_id: u32, branch_mask: u64, doc: &Document) -> u32 {
        let id = self.doc_count() as u32;
        self.doc_names.push(doc.name.clone());
        self.repo_index.push(repo_id);
        self.branch_masks.push(branch_mask);
        self.sub_repo_index.push(doc.sub_repository_path.clone());
        self.language_codes.push(doc.language.clone());
        self.categories.push(doc.category);
        self.skipped.push(false);

        let content = doc.content.as_deref().unwrap_or_default();
        if self.boundaries.is_empty() {
            self.boundaries.push(0);
        }
        let start = *self.boundaries.last().unwrap();
        self.content.extend_from_slice(content);
        self.boundaries.push(start + content.len() as u64);

        self.rune_offsets.push(RuneOffsetTable::build(content));
        self.symbol_sections.push(doc.symbols.clone());

        let text = String::from_utf8_lossy(content);
        self.trigram_content.index_text(id, &text, 0);
        self.trigram_name.index_text(id, &doc.name, 0);
        self.trigram_content_fold.index_text(id, &text.to_lowercase(), 0);
        self.trigram_name_fold.index_text(id, &doc.name.to_lowercase(), 0);

        id
    }

    /// Appends a skipped document: name only, no content contribution
    /// (spec.md §3: "keeps only their name").
    pub fn push_skipped(&mut self, repo_id: u32, name: &str) -> u32 {
        let id = self.doc_count() as u32;
        self.doc_names.push(name.to_string());
        self.repo_index.push(repo_id);
        self.branch_masks.push(0);
        self.sub_repo_index.push(String::new());
        self.language_codes.push(String::new());
        self.categories.push(DocumentCategory::Normal);
        self.skipped.push(true);
        if self.boundaries.is_empty() {
            self.boundaries.push(0);
        }
        let last = *self.boundaries.last().unwrap();
        self.boundaries.push(last);
        self.rune_offsets.push(RuneOffsetTable::default());
        self.symbol_sections.push(Vec::new());
        id
    }

    pub fn validate(&self) -> Result<()> {
        if self.boundaries.first() != Some(&0) {
            return Err(ShardError::InternalInvariant("boundaries[0] != 0".into()));
        }
        if self.boundaries.len() != self.doc_count() + 1 {
            return Err(ShardError::InternalInvariant(
                "boundaries length mismatch".into(),
            ));
        }
        let mut last_repo = 0u32;
        for &repo in &self.repo_index {
            if repo < last_repo {
                return Err(ShardError::InternalInvariant(
                    "repo ids are not non-decreasing".into(),
                ));
            }
            last_repo = repo;
        }
        for (doc, &mask) in self.branch_masks.iter().enumerate() {
            if self.skipped[doc] {
                continue;
            }
            let repo_id = self.repo_index[doc];
            let repo = self.repository(repo_id).ok_or_else(|| {
                ShardError::InternalInvariant(format!("doc {doc} references unknown repo"))
            })?;
            if mask == 0 || mask & !repo.branch_bits() != 0 {
                return Err(ShardError::InternalInvariant(format!(
                    "doc {doc} branch mask {mask:#x} invalid for repo branch bits {:#x}",
                    repo.branch_bits()
                )));
            }
        }
        Ok(())
    }
}

const SEC_CONTENT: &str = "content";
const SEC_DOC_NAMES: &str = "filename_content";
const SEC_BOUNDARIES: &str = "boundaries";
const SEC_BRANCH_MASKS: &str = "branch_masks";
const SEC_REPO_INDEX: &str = "repo_index";
const SEC_SUBREPO_INDEX: &str = "subrepo_index";
const SEC_LANGUAGE_CODES: &str = "language_code";
const SEC_CATEGORY: &str = "category";
const SEC_SKIPPED: &str = "skipped";
const SEC_RUNE_OFFSETS: &str = "rune_offsets";
const SEC_SYMBOL_SECTIONS: &str = "symbol_sections";
const SEC_TRIGRAM_CONTENT: &str = "trigram_postings_content";
const SEC_TRIGRAM_NAME: &str = "trigram_postings_name";
const SEC_TRIGRAM_CONTENT_FOLD: &str = "trigram_postings_content_fold";
const SEC_TRIGRAM_NAME_FOLD: &str = "trigram_postings_name_fold";
const SEC_REPO_METADATA: &str = "repo_metadata";

pub fn write_shard_content(content: &ShardContent, version: u32) -> Result<Vec<u8>> {
    content.validate()?;
    let mut w = TocWriter::new();
    w.write_section(SEC_CONTENT, &content.content);
    w.write_section_postcard(SEC_DOC_NAMES, &content.doc_names)?;
    w.write_section_postcard(SEC_BOUNDARIES, &content.boundaries)?;
    w.write_section_postcard(SEC_BRANCH_MASKS, &content.branch_masks)?;
    w.write_section_postcard(SEC_REPO_INDEX, &content.repo_index)?;
    w.write_section_postcard(SEC_SUBREPO_INDEX, &content.sub_repo_index)?;
    w.write_section_postcard(SEC_LANGUAGE_CODES, &content.language_codes)?;
    w.write_section_postcard(SEC_CATEGORY, &content.categories)?;
    w.write_section_postcard(SEC_SKIPPED, &content.skipped)?;
    w.write_section_postcard(SEC_RUNE_OFFSETS, &content.rune_offsets)?;
    w.write_section_postcard(SEC_SYMBOL_SECTIONS, &content.symbol_sections)?;
    w.write_section_postcard(SEC_TRIGRAM_CONTENT, &content.trigram_content)?;
    w.write_section_postcard(SEC_TRIGRAM_NAME, &content.trigram_name)?;
    w.write_section_postcard(SEC_TRIGRAM_CONTENT_FOLD, &content.trigram_content_fold)?;
    w.write_section_postcard(SEC_TRIGRAM_NAME_FOLD, &content.trigram_name_fold)?;
    w.write_section_postcard(SEC_REPO_METADATA, &content.repositories)?;
    Ok(w.finish(version))
}

fn decode_section<T: for<'de> Deserialize<'de>>(bytes: &[u8], toc: &Toc, name: &str) -> Result<T> {
    let slice = toc.get(bytes, name)?;
    postcard::from_bytes(slice).map_err(|e| ShardError::Corruption {
        reason: format!("bad section {name}: {e}"),
        section: Some(name.to_string()),
    })
}

pub fn decode_shard_content(bytes: &[u8]) -> Result<(u32, ShardContent)> {
    let (footer, toc) = toc::read_toc(bytes)?;
    let content = ShardContent {
        repositories: decode_section(bytes, &toc, SEC_REPO_METADATA)?,
        doc_names: decode_section(bytes, &toc, SEC_DOC_NAMES)?,
        content: toc.get(bytes, SEC_CONTENT)?.to_vec(),
        boundaries: decode_section(bytes, &toc, SEC_BOUNDARIES)?,
        branch_masks: decode_section(bytes, &toc, SEC_BRANCH_MASKS)?,
        repo_index: decode_section(bytes, &toc, SEC_REPO_INDEX)?,
        sub_repo_index: decode_section(bytes, &toc, SEC_SUBREPO_INDEX)?,
        language_codes: decode_section(bytes, &toc, SEC_LANGUAGE_CODES)?,
        categories: decode_section(bytes, &toc, SEC_CATEGORY)?,
        rune_offsets: decode_section(bytes, &toc, SEC_RUNE_OFFSETS)?,
        symbol_sections: decode_section(bytes, &toc, SEC_SYMBOL_SECTIONS)?,
        skipped: decode_section(bytes, &toc, SEC_SKIPPED)?,
        trigram_content: decode_section(bytes, &toc, SEC_TRIGRAM_CONTENT)?,
        trigram_name: decode_section(bytes, &toc, SEC_TRIGRAM_NAME)?,
        trigram_content_fold: decode_section(bytes, &toc, SEC_TRIGRAM_CONTENT_FOLD)?,
        trigram_name_fold: decode_section(bytes, &toc, SEC_TRIGRAM_NAME_FOLD)?,
    };
    content.validate()?;
    Ok((footer.version, content))
}

/// A loaded shard: the memory map backing it plus the decoded sections.
/// `mmap` is kept alive for the shard's lifetime even though decoding is
/// eager (see DESIGN.md) — dropping it would be sound either way since
/// `content` no longer borrows from it, but keeping it makes a future move
/// to lazy, zero-copy section views a localized change.
pub struct IndexData {
    #[allow(dead_code)]
    mmap: Mmap,
    pub version: u32,
    pub content: ShardContent,
}

impl IndexData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let (version, content) = decode_shard_content(&mmap)?;
        Ok(Self {
            mmap,
            version,
            content,
        })
    }

    pub fn from_bytes_for_test(bytes: &[u8]) -> Result<ShardContent> {
        let (_, content) = decode_shard_content(bytes)?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::repository::Repository;

    #[test]
    fn roundtrip_single_document() {
        let mut repo = Repository::new(0, "repoA");
        repo.add_branch("main", "v1");
        let mut content = ShardContent::default();
        content.repositories.push(repo.clone());
        let doc = Document::new("hello.rs", b"fn main() {}".to_vec())
            .with_branches(["main".to_string()]);
        let mask = repo.encode_branch_mask(&doc.branches);
        content.push_document(0, mask, &doc);

        let bytes = write_shard_content(&content, crate::naming::FORMAT_VERSION_V16).unwrap();
        let (version, decoded) = decode_shard_content(&bytes).unwrap();
        assert_eq!(version, crate::naming::FORMAT_VERSION_V16);
        assert_eq!(decoded.doc_count(), 1);
        assert_eq!(decoded.doc_content(0), b"fn main() {}");
        assert_eq!(decoded.branch_masks[0], 1);
    }
}
