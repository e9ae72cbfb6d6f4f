//! Opt-in BM25 scoring (spec.md §4.5 "BM25 alternative"): "per-line and
//! per-file scores via term-frequency; file matches and symbol matches
//! count as 5 occurrences; standard Lucene defaults k=1.2, b=0.75; line
//! length normalization against a heuristic average of 100 bytes; file
//! length normalization against the shard's mean content size."

use match_engine::ShardMatch;
use shard_format::ShardContent;

pub const K1: f64 = 1.2;
pub const B: f64 = 0.75;
pub const AVG_LINE_LEN: f64 = 100.0;
/// A file-name or symbol match stands in for this many plain-content
/// occurrences when accumulating term frequency (spec.md: "count as 5
/// occurrences").
pub const FILE_OR_SYMBOL_WEIGHT: f64 = 5.0;

fn bm25_term(term_freq: f64, doc_len: f64, avg_len: f64) -> f64 {
    let numerator = term_freq * (K1 + 1.0);
    let denominator = term_freq + K1 * (1.0 - B + B * (doc_len / avg_len));
    numerator / denominator
}

/// Line-level BM25 term-frequency score: `ranges.len()` stands in for term
/// frequency (every leaf contributes one occurrence; spec.md doesn't split
/// frequency per distinct term, since `DocMatches` doesn't retain which
/// query leaf produced which range).
pub fn line_bm25(range_count: usize, line_len: usize, symbol_hits: usize) -> f64 {
    let tf = range_count as f64 + symbol_hits as f64 * (FILE_OR_SYMBOL_WEIGHT - 1.0);
    bm25_term(tf, line_len.max(1) as f64, AVG_LINE_LEN)
}

fn mean_content_size(shard: &ShardContent) -> f64 {
    let n = shard.doc_count().max(1) as f64;
    let total: u64 = shard
        .boundaries
        .last()
        .copied()
        .unwrap_or(0);
    total as f64 / n
}

/// File-level BM25 score: sums each content line's term frequency plus a
/// fixed per-file-name-match contribution, normalized against the shard's
/// mean document size.
pub fn file_bm25(shard: &ShardContent, m: &ShardMatch, score_offset_bm25: f64, repo_rank_tiebreaker: f64, file_order_tiebreaker: f64) -> f64 {
    let avg_len = mean_content_size(shard);
    let doc_len = shard.doc_content(m.doc).len().max(1) as f64;
    let mut tf = 0.0;
    for line in &m.matches.lines {
        let symbol_hits = if line.symbol_index.is_some() { 1 } else { 0 };
        tf += line.ranges.len() as f64 + symbol_hits as f64 * (FILE_OR_SYMBOL_WEIGHT - 1.0);
    }
    tf += m.matches.file_name_ranges.len() as f64 * FILE_OR_SYMBOL_WEIGHT;
    let score = bm25_term(tf, doc_len, avg_len.max(1.0));
    score * score_offset_bm25 + repo_rank_tiebreaker + file_order_tiebreaker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_occurrences_score_higher() {
        let few = bm25_term(1.0, 100.0, 100.0);
        let many = bm25_term(5.0, 100.0, 100.0);
        assert!(many > few);
    }

    #[test]
    fn longer_than_average_line_is_penalized() {
        let short = bm25_term(2.0, 50.0, 100.0);
        let long = bm25_term(2.0, 400.0, 100.0);
        assert!(short > long);
    }
}
