//! Per-file scoring and sort/truncation (spec.md §4.5 second half): "File
//! score = ScoreOffset × max(line scores) + atom_count_boost × (1 − 1/atoms)
//! + repo_rank × rankFactor + file_order × fileOrderFactor. Truncation to
//! integer before adding tiebreakers keeps tiers discrete."

use crate::line_score::{score_content_line, score_file_name_match};
use crate::weights::{category_term, Weights};
use match_engine::ShardMatch;
use shard_format::ShardContent;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFile {
    pub doc: u32,
    pub repo_name: String,
    pub score: f64,
    pub matches: match_engine::DocMatches,
}

/// Scores one shard match. `atom_count` is the number of distinct query
/// leaves that contributed a match to this document (the caller — the
/// match-tree compiler knows its own leaf count); `file_order` is this
/// document's position within the shard's ranking order (spec.md §4.1
/// item 5), used only as a deterministic tiebreaker here.
pub fn score_shard_match(
    weights: &Weights,
    shard: &ShardContent,
    m: &ShardMatch,
    atom_count: usize,
    file_order: usize,
) -> ScoredFile {
    let doc = m.doc as usize;
    let repo = shard.repository(shard.repo_index[doc]);
    let repo_name = repo.map(|r| r.name.clone()).unwrap_or_default();
    let rank = repo.map(|r| r.rank).unwrap_or(0);
    let doc_name = &shard.doc_names[doc];
    let content = shard.doc_content(doc as u32);
    let category_bonus = category_term(shard.categories[doc]);

    let mut line_scores: Vec<f64> = m
        .matches
        .lines
        .iter()
        .map(|line| {
            let text = &content[line.line_start as usize..line.line_end.min(content.len() as u32) as usize];
            let symbol = line
                .symbol_index
                .and_then(|i| shard.symbol_sections[doc].get(i));
            score_content_line(weights, line, text, symbol) + category_bonus
        })
        .collect();

    for range in &m.matches.file_name_ranges {
        line_scores.push(score_file_name_match(weights, doc_name, *range));
    }

    let max_line = line_scores.iter().cloned().fold(0.0_f64, f64::max);
    let atoms = atom_count.max(1) as f64;
    let mut score = weights.score_offset * max_line
        + weights.atom_count_boost * (1.0 - 1.0 / atoms)
        + rank as f64 * weights.rank_factor;
    score *= m.matches.boost;
    score = score.trunc();
    score += file_order as f64 * weights.file_order_factor;

    ScoredFile {
        doc: m.doc,
        repo_name,
        score,
        matches: m.matches.clone(),
    }
}
