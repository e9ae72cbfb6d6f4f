//! Trigram postings (spec.md §3, §4.1, §9 "Posting-list iteration").
//!
//! A trigram is a 3-rune shingle. Every shingle in a document's content (and,
//! separately, in its file name) is recorded as a `(doc id, rune offset)`
//! pair in a sorted posting list keyed by the shingle. A substring leaf with
//! a pattern of `n >= 3` runes is answered by taking the pattern's `n - 2`
//! trigrams and merging their posting lists, keeping only positions where
//! consecutive trigrams land at consecutive rune offsets (spec.md §9:
//! "an N-way merge with bounded scratch").

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Three Unicode code points packed into 63 bits (each code point fits in
/// 21 bits), used as the posting-list key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrigramKey(u64);

impl TrigramKey {
    pub fn new(a: char, b: char, c: char) -> Self {
        TrigramKey(((a as u64) << 42) | ((b as u64) << 21) | (c as u64))
    }
}

/// One occurrence of a trigram: the document it was found in and the rune
/// (not byte) offset of the shingle's first code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Posting {
    pub doc: u32,
    pub rune_offset: u32,
}

/// A sorted-by-`(doc, rune_offset)` posting list for one trigram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostingList(pub Vec<Posting>);

impl PostingList {
    pub fn push(&mut self, doc: u32, rune_offset: u32) {
        self.0.push(Posting { doc, rune_offset });
    }

    /// Must be called once per document after all of that document's
    /// postings are pushed in increasing rune-offset order, and documents
    /// are processed in increasing doc-id order; this keeps the list sorted
    /// without a second pass.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Map from trigram to posting list, built incrementally by the shard
/// builder and consulted read-only by the match-tree compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrigramIndex {
    postings: BTreeMap<TrigramKey, PostingList>,
}

impl TrigramIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: TrigramKey) -> Option<&PostingList> {
        self.postings.get(&key)
    }

    /// Records every trigram of `text` as occurring in `doc`, starting rune
    /// offsets at `base_rune_offset` (non-zero when indexing a repeated
    /// stream such as concatenated file names sharing one index).
    pub fn index_text(&mut self, doc: u32, text: &str, base_rune_offset: u32) {
        for (offset, key) in trigrams(text) {
            self.postings
                .entry(key)
                .or_default()
                .push(doc, base_rune_offset + offset);
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TrigramKey, &PostingList)> {
        self.postings.iter()
    }
}

/// Yields every trigram of `text` paired with the rune offset of its first
/// code point. Patterns shorter than 3 runes have no trigram and must be
/// handled by the caller (spec.md §4.3: "degrades to a RegexpMatchTree").
pub fn trigrams(text: &str) -> impl Iterator<Item = (u32, TrigramKey)> + '_ {
    let chars: Vec<char> = text.chars().collect();
    (0..chars.len().saturating_sub(2)).map(move |i| {
        (
            i as u32,
            TrigramKey::new(chars[i], chars[i + 1], chars[i + 2]),
        )
    })
}

pub fn rune_count(text: &str) -> usize {
    text.chars().count()
}

/// A verified-pending match location: the rune offset at which every
/// trigram of the pattern was found contiguously in `doc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub doc: u32,
    pub rune_offset: u32,
}

/// Trigram count ceiling check input (spec.md §4.1 item 1).
pub fn trigram_count(text: &str) -> usize {
    text.chars().count().saturating_sub(2)
}

/// Intersects posting lists for the trigrams of a pattern, keeping only
/// positions where trigram `k` lands at `start + k` (spec.md §9: "N-way
/// merge with bounded scratch"). `lists[0]` is walked as the anchor; the
/// others are advanced with a single forward-only pointer each, so the
/// whole pass is O(sum of list lengths) with O(lists.len()) scratch.
pub fn intersect_aligned(lists: &[&PostingList]) -> Vec<Candidate> {
    if lists.is_empty() {
        return Vec::new();
    }
    if lists.len() == 1 {
        return lists[0]
            .0
            .iter()
            .map(|p| Candidate {
                doc: p.doc,
                rune_offset: p.rune_offset,
            })
            .collect();
    }

    let mut idx = vec![0usize; lists.len()];
    let mut out = Vec::new();
    while idx[0] < lists[0].0.len() {
        let anchor = lists[0].0[idx[0]];
        let mut all_match = true;
        for k in 1..lists.len() {
            let target = Posting {
                doc: anchor.doc,
                rune_offset: anchor.rune_offset + k as u32,
            };
            while idx[k] < lists[k].0.len() && lists[k].0[idx[k]] < target {
                idx[k] += 1;
            }
            if idx[k] >= lists[k].0.len() || lists[k].0[idx[k]] != target {
                all_match = false;
                break;
            }
        }
        if all_match {
            out.push(Candidate {
                doc: anchor.doc,
                rune_offset: anchor.rune_offset,
            });
        }
        idx[0] += 1;
    }
    out
}
