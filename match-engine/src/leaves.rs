//! Leaf matchers (spec.md §4.3 items 1-5, §4.4).

use crate::error::Result;
use crate::matcher::Matcher;
use crate::types::{ByteRange, CostTier, DocMatches, LineMatch};
use regex::bytes::Regex;
use shard_format::{trigrams, Candidate, PostingList, ShardContent, TrigramKey};

/// Always matches or never matches, with no shard access (spec.md §4.3's
/// `Const` tier).
pub struct ConstMatcher(pub bool);

impl Matcher for ConstMatcher {
    fn cost(&self) -> CostTier {
        CostTier::Const
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        if self.0 && from < shard.doc_count() as u32 {
            Some(from)
        } else {
            None
        }
    }

    fn doc_matches(&self, _: &ShardContent, _: u32, _: &search_cancel::CancellationToken) -> Result<Option<DocMatches>> {
        Ok(if self.0 { Some(DocMatches::default()) } else { None })
    }
}

/// A `Memory`-tier matcher over one per-document array, used for `Branch`,
/// `Language`, `Repo`/`RepoIds`, `Type`, and `RawConfig` leaves. `predicate`
/// is evaluated once per candidate doc; no content is read.
pub struct MemoryMatcher<F> {
    pub predicate: F,
}

impl<F> Matcher for MemoryMatcher<F>
where
    F: Fn(&ShardContent, u32) -> bool + Send + Sync,
{
    fn cost(&self) -> CostTier {
        CostTier::Memory
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        (from..shard.doc_count() as u32).find(|&d| (self.predicate)(shard, d))
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        _: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        Ok(if (self.predicate)(shard, doc) {
            Some(DocMatches::default())
        } else {
            None
        })
    }
}

/// Literal substring search (spec.md §4.3 item 1). Patterns of 3+ runes use
/// the trigram index to build a candidate set before any byte scanning;
/// shorter patterns degrade to a full scan (spec.md §4.3: "patterns under 3
/// runes have no trigram and are scanned directly").
pub struct SubstringMatcher {
    pub pattern: String,
    pub case_sensitive: bool,
    pub content: bool,
    pub file_name: bool,
    pub word_boundary: bool,
}

impl SubstringMatcher {
    fn candidates(&self, index: &shard_format::TrigramIndex, pattern: &str) -> Option<Vec<Candidate>> {
        let grams: Vec<(u32, TrigramKey)> = trigrams(pattern).collect();
        if grams.is_empty() {
            return None;
        }
        let lists: Vec<PostingList> = grams
            .iter()
            .map(|(_, k)| index.get(*k).cloned().unwrap_or_default())
            .collect();
        if lists.iter().any(|l| l.is_empty()) {
            return Some(Vec::new());
        }
        let refs: Vec<&PostingList> = lists.iter().collect();
        Some(shard_format::intersect_aligned(&refs))
    }

    /// Case-insensitive lookups consult `trigram_content_fold`/
    /// `trigram_name_fold` instead of the raw-case indices, and lower the
    /// pattern to match the trigram keys the fold index was built from
    /// (spec.md §4.3: "a case-folded trigram view"); without this, a
    /// lowered pattern never finds a posting list keyed by mixed-case
    /// trigrams and every case-insensitive query would silently fall back
    /// to a full scan.
    fn candidate_docs(&self, shard: &ShardContent) -> Option<Vec<u32>> {
        let mut docs = std::collections::BTreeSet::new();
        let pattern = if self.case_sensitive {
            self.pattern.clone()
        } else {
            self.pattern.to_lowercase()
        };
        if self.content {
            let index = if self.case_sensitive {
                &shard.trigram_content
            } else {
                &shard.trigram_content_fold
            };
            let c = self.candidates(index, &pattern)?;
            docs.extend(c.into_iter().map(|c| c.doc));
        }
        if self.file_name {
            let index = if self.case_sensitive {
                &shard.trigram_name
            } else {
                &shard.trigram_name_fold
            };
            let c = self.candidates(index, &pattern)?;
            docs.extend(c.into_iter().map(|c| c.doc));
        }
        Some(docs.into_iter().collect())
    }

    fn scan(&self, haystack: &str) -> Vec<ByteRange> {
        let (hay, needle) = if self.case_sensitive {
            (haystack.to_string(), self.pattern.clone())
        } else {
            (haystack.to_lowercase(), self.pattern.to_lowercase())
        };
        if needle.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut start = 0;
        while let Some(pos) = hay[start..].find(&needle) {
            let abs = start + pos;
            if !self.word_boundary || is_word_bounded(&hay, abs, abs + needle.len()) {
                out.push(ByteRange {
                    start: abs as u32,
                    end: (abs + needle.len()) as u32,
                });
            }
            start = abs + needle.len().max(1);
        }
        out
    }
}

fn is_word_bounded(s: &str, start: usize, end: usize) -> bool {
    let before_ok = s[..start].chars().next_back().map_or(true, |c| !c.is_alphanumeric() && c != '_');
    let after_ok = s[end..].chars().next().map_or(true, |c| !c.is_alphanumeric() && c != '_');
    before_ok && after_ok
}

impl Matcher for SubstringMatcher {
    fn cost(&self) -> CostTier {
        CostTier::Content
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        match self.candidate_docs(shard) {
            Some(docs) => docs.into_iter().find(|&d| d >= from),
            None => {
                if from < shard.doc_count() as u32 {
                    Some(from)
                } else {
                    None
                }
            }
        }
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        _: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        if shard.skipped[doc as usize] {
            return Ok(None);
        }
        let mut result = DocMatches::default();
        if self.file_name {
            let ranges = self.scan(&shard.doc_names[doc as usize]);
            result.file_name_ranges.extend(ranges);
        }
        if self.content {
            let content = shard.doc_content(doc);
            let text = String::from_utf8_lossy(content);
            for (line_no, (line_start, line)) in line_starts(&text).enumerate() {
                let ranges = self.scan(line);
                if ranges.is_empty() {
                    continue;
                }
                let offset_ranges = ranges
                    .into_iter()
                    .map(|r| ByteRange {
                        start: line_start as u32 + r.start,
                        end: line_start as u32 + r.end,
                    })
                    .collect();
                result.lines.push(LineMatch {
                    line_number: line_no as u32 + 1,
                    line_start: line_start as u32,
                    line_end: (line_start + line.len()) as u32,
                    ranges: offset_ranges,
                    symbol_index: None,
                });
            }
        }
        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }
}

/// Splits `text` into lines paired with each line's starting byte offset.
fn line_starts(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}

/// Regex search over document content (spec.md §4.3 item 2), the most
/// expensive tier. When `candidates` is `Some`, only those documents are
/// scanned (the simplifier's trigram pre-filter narrowed the search);
/// otherwise every document is a candidate.
pub struct RegexpMatcher {
    pub regex: Regex,
    pub content: bool,
    pub file_name: bool,
}

impl Matcher for RegexpMatcher {
    fn cost(&self) -> CostTier {
        CostTier::Regexp
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        if from < shard.doc_count() as u32 {
            Some(from)
        } else {
            None
        }
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        _: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        if shard.skipped[doc as usize] {
            return Ok(None);
        }
        let mut result = DocMatches::default();
        if self.file_name {
            for m in self.regex.find_iter(shard.doc_names[doc as usize].as_bytes()) {
                result.file_name_ranges.push(ByteRange {
                    start: m.start() as u32,
                    end: m.end() as u32,
                });
            }
        }
        if self.content {
            let content = shard.doc_content(doc);
            let table = line_table(content);
            let mut per_line: std::collections::BTreeMap<usize, Vec<ByteRange>> =
                std::collections::BTreeMap::new();
            for m in self.regex.find_iter(content) {
                let mstart = m.start() as u32;
                let mend = m.end() as u32;
                let mut idx = match table.binary_search_by(|&(s, _)| s.cmp(&mstart)) {
                    Ok(i) => i,
                    Err(i) => i.saturating_sub(1),
                };
                loop {
                    let (ls, le) = table[idx];
                    let rstart = mstart.max(ls);
                    let rend = mend.min(le);
                    if rend > rstart || mstart == mend {
                        per_line.entry(idx).or_default().push(ByteRange {
                            start: rstart,
                            end: rend,
                        });
                    }
                    if mend <= le || idx + 1 >= table.len() {
                        break;
                    }
                    idx += 1;
                }
            }
            for (idx, ranges) in per_line {
                let (line_start, line_end) = table[idx];
                result.lines.push(LineMatch {
                    line_number: idx as u32 + 1,
                    line_start,
                    line_end,
                    ranges,
                    symbol_index: None,
                });
            }
        }
        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }
}

/// Maps each line to its `(start, end)` byte offsets within `content`, so a
/// regex match found over the whole content stream (spec.md §4.3 item 2:
/// matching the stream preserves `^`/`$`/multi-line semantics that
/// per-line scanning breaks) can be attributed back to the line(s) it
/// falls in, splitting across a line boundary if the match crosses one.
fn line_table(content: &[u8]) -> Vec<(u32, u32)> {
    let mut table = Vec::new();
    let mut start = 0usize;
    for (i, &b) in content.iter().enumerate() {
        if b == b'\n' {
            table.push((start as u32, i as u32));
            start = i + 1;
        }
    }
    table.push((start as u32, content.len() as u32));
    table
}
