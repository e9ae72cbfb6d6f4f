//! The evaluator protocol (spec.md §4.4): every compiled query node is a
//! [`Matcher`]. `next_doc` lets an `And`/`Or` skip whole ranges of documents
//! a cheap tier already ruled out; `doc_matches` does the expensive per-doc
//! work only for documents that survive.

use crate::error::Result;
use crate::types::{CostTier, DocMatches};
use shard_format::ShardContent;

pub trait Matcher {
    fn cost(&self) -> CostTier;

    /// Smallest document id `>= from` this matcher could possibly match, or
    /// `None` once no more candidates remain. `Regexp`-tier leaves that have
    /// no cheaper candidate set return `from` itself (every doc is a
    /// candidate) so the evaluator still has a correct, if unhelpful, value
    /// to drive iteration with.
    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32>;

    /// Confirms the match and collects positions. Returning `Ok(None)`
    /// (as opposed to `Ok(Some(empty))`) means the document does not match
    /// at all, distinguishing "no lines matched" from "matched but recorded
    /// no visible spans" (e.g. a pure `Branch` filter).
    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>>;
}

pub type BoxMatcher = Box<dyn Matcher + Send + Sync>;
