//! Drives a compiled matcher over a shard: the `next_doc` skip-scan loop,
//! per-document match collection, and the `prune` pass that drops documents
//! whose only matches came from metadata leaves with no visible span
//! (spec.md §4.4 "Match tree evaluation").

use crate::error::Result;
use crate::matcher::BoxMatcher;
use crate::types::DocMatches;
use search_cancel::CancellationToken;
use shard_format::ShardContent;
use tracing::debug;

/// One document's surviving matches, tagged with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardMatch {
    pub doc: u32,
    pub matches: DocMatches,
}

/// Runs `matcher` over every candidate document in `shard`, checking
/// `cancel` between documents (spec.md §4.6: "cancellation checked at a
/// per-document cadence"). A query that is purely a metadata filter (e.g.
/// `Branch("main")` alone) produces matches with empty `DocMatches`; callers
/// that need "at least one visible span" should additionally require
/// `visit_matches` to be non-empty, since spec.md's `prune` pass is about
/// dropping candidates that fail confirmation, not about requiring spans.
pub fn search_shard(matcher: &BoxMatcher, shard: &ShardContent, cancel: &CancellationToken) -> Result<Vec<ShardMatch>> {
    let mut out = Vec::new();
    let mut next = 0u32;
    while let Some(doc) = matcher.next_doc(shard, next) {
        cancel.check()?;
        if let Some(mut matches) = matcher.doc_matches(shard, doc, cancel)? {
            // A `NoVisit` prefilter sharing an `And` with the regex it
            // narrows can report the same span twice (spec.md §4.3); sort
            // and dedup here so every caller sees one clean result.
            matches.sort_and_dedup();
            out.push(ShardMatch { doc, matches });
        }
        next = doc + 1;
    }
    debug!(candidates = out.len(), "shard evaluation complete");
    Ok(out)
}

/// Collects just the visible spans (line ranges, file-name ranges) across
/// every surviving match, discarding pure-metadata hits with no span —
/// the `visit_matches` pass referenced throughout spec.md §4.4.
pub fn visit_matches(results: &[ShardMatch]) -> Vec<&ShardMatch> {
    results.iter().filter(|r| !r.matches.is_empty()).collect()
}
