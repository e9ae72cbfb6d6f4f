//! `And`/`Or`/`Not` combinators and the `AndLineMatchTree` optimization
//! (spec.md §4.3 item 8, §4.4).

use crate::error::Result;
use crate::matcher::{BoxMatcher, Matcher};
use crate::types::{CostTier, DocMatches, LineMatch};
use shard_format::ShardContent;

/// Conjunction. Children are sorted cheapest-first by the compiler so a
/// `Const`/`Memory` leaf can rule a document out before any `Content`/
/// `Regexp` work runs (spec.md §4.3: "cost-tiered evaluator").
pub struct AndMatcher {
    pub children: Vec<BoxMatcher>,
}

impl Matcher for AndMatcher {
    fn cost(&self) -> CostTier {
        self.children.iter().map(|c| c.cost()).max().unwrap_or(CostTier::Const)
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        let mut candidate = from;
        'outer: loop {
            for child in &self.children {
                match child.next_doc(shard, candidate) {
                    Some(d) if d == candidate => continue,
                    Some(d) => {
                        candidate = d;
                        continue 'outer;
                    }
                    None => return None,
                }
            }
            return Some(candidate);
        }
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        let mut merged = DocMatches::default();
        for child in &self.children {
            cancel.check()?;
            match child.doc_matches(shard, doc, cancel)? {
                Some(m) => {
                    merged.boost *= m.boost;
                    merged.merge(m);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(merged))
    }
}

pub struct OrMatcher {
    pub children: Vec<BoxMatcher>,
}

impl Matcher for OrMatcher {
    fn cost(&self) -> CostTier {
        self.children.iter().map(|c| c.cost()).max().unwrap_or(CostTier::Const)
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        self.children.iter().filter_map(|c| c.next_doc(shard, from)).min()
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        let mut merged = DocMatches::default();
        let mut any = false;
        for child in &self.children {
            cancel.check()?;
            if let Some(m) = child.doc_matches(shard, doc, cancel)? {
                merged.boost = if any { merged.boost.max(m.boost) } else { m.boost };
                any = true;
                merged.merge(m);
            }
        }
        Ok(if any { Some(merged) } else { None })
    }
}

/// Negation relative to the whole document universe: a document matches iff
/// `inner` does not (spec.md §4.3: `Not` has no candidate set of its own,
/// so it never narrows `next_doc` — the surrounding `And` supplies that).
pub struct NotMatcher {
    pub inner: BoxMatcher,
}

impl Matcher for NotMatcher {
    fn cost(&self) -> CostTier {
        self.inner.cost()
    }

    fn next_doc(&self, _shard: &ShardContent, from: u32) -> Option<u32> {
        Some(from)
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        cancel.check()?;
        Ok(if self.inner.doc_matches(shard, doc, cancel)?.is_none() {
            Some(DocMatches::default())
        } else {
            None
        })
    }
}

/// Wraps N content-tier children that must all match on the *same line*
/// rather than merely the same document (spec.md §4.3 item 8:
/// "`AndLineMatchTree`... line co-occurrence optimization" — narrows an
/// `And` of substring/regex leaves from "all present in file" to "all
/// present on one line" without a second scan). Every child's ranges for a
/// shared line are kept, not just the first child's.
pub struct AndLineMatchTree {
    pub children: Vec<BoxMatcher>,
}

impl Matcher for AndLineMatchTree {
    fn cost(&self) -> CostTier {
        self.children.iter().map(|c| c.cost()).max().unwrap_or(CostTier::Const)
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        let mut candidate = from;
        'outer: loop {
            for child in &self.children {
                match child.next_doc(shard, candidate) {
                    Some(d) if d == candidate => continue,
                    Some(d) => {
                        candidate = d;
                        continue 'outer;
                    }
                    None => return None,
                }
            }
            return Some(candidate);
        }
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        cancel.check()?;
        let mut per_child = Vec::with_capacity(self.children.len());
        let mut boost = 1.0;
        for child in &self.children {
            match child.doc_matches(shard, doc, cancel)? {
                Some(m) => {
                    boost *= m.boost;
                    per_child.push(m);
                }
                None => return Ok(None),
            }
        }
        let Some((first, rest)) = per_child.split_first() else {
            return Ok(None);
        };
        let mut shared: Vec<LineMatch> = Vec::new();
        for lm in &first.lines {
            let mut matches_all = true;
            let mut merged = lm.clone();
            for other in rest {
                match other.lines.iter().find(|o| o.line_number == lm.line_number) {
                    Some(om) => merged.ranges.extend(om.ranges.iter().copied()),
                    None => {
                        matches_all = false;
                        break;
                    }
                }
            }
            if matches_all {
                shared.push(merged);
            }
        }
        if shared.is_empty() {
            return Ok(None);
        }
        Ok(Some(DocMatches {
            lines: shared,
            file_name_ranges: Vec::new(),
            boost,
        }))
    }
}

/// Wraps `inner` so its matched spans never surface: used around a regex's
/// extracted trigram prefilter, which must narrow candidates without the
/// prefilter's own (usually coarser) ranges leaking into results (spec.md
/// §4.3: `NoVisitMatchTree`).
pub struct NoVisitMatcher {
    pub inner: BoxMatcher,
}

impl Matcher for NoVisitMatcher {
    fn cost(&self) -> CostTier {
        self.inner.cost()
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        self.inner.next_doc(shard, from)
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        cancel.check()?;
        Ok(self
            .inner
            .doc_matches(shard, doc, cancel)?
            .map(|_| DocMatches::default()))
    }
}

/// Scales the matched boost factor without otherwise changing `inner`'s
/// result (spec.md §4.2 item 11: `Boost{query, factor}`).
pub struct BoostMatcher {
    pub inner: BoxMatcher,
    pub factor: f64,
}

impl Matcher for BoostMatcher {
    fn cost(&self) -> CostTier {
        self.inner.cost()
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        self.inner.next_doc(shard, from)
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        cancel.check()?;
        Ok(self.inner.doc_matches(shard, doc, cancel)?.map(|mut m| {
            m.boost *= self.factor;
            m
        }))
    }
}
