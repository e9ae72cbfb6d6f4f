//! Per-line scoring (spec.md §4.5 first paragraph): sums an additive term
//! per match on the line, classified as a full word match, a partial word
//! match, a basename match (for file-name ranges), or a symbol match.

use crate::weights::Weights;
use match_engine::{ByteRange, LineMatch};
use shard_format::SymbolSection;

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Whether the byte immediately before/after `range` (within `text`) is a
/// non-word byte, i.e. `range` sits on a word boundary on that side.
fn boundary(text: &[u8], start: u32, end: u32) -> (bool, bool) {
    let before_ok = start == 0 || !is_word_byte(text[start as usize - 1]);
    let after_ok = end as usize >= text.len() || !is_word_byte(text[end as usize]);
    (before_ok, after_ok)
}

fn word_match_term(weights: &Weights, text: &[u8], range: ByteRange) -> f64 {
    let (before, after) = boundary(text, range.start, range.end);
    match (before, after) {
        (true, true) => weights.word_match,
        (true, false) | (false, true) => weights.partial_word_match,
        (false, false) => 0.0,
    }
}

/// Classifies a file-name-range match against the file's basename
/// (spec.md §4.5: "Base", "EdgeBase", "InnerBase").
fn basename_term(weights: &Weights, doc_name: &str, range: ByteRange) -> f64 {
    let basename_start = doc_name
        .rfind('/')
        .map(|i| i as u32 + 1)
        .unwrap_or(0);
    let basename_len = doc_name.len() as u32 - basename_start;
    if range.start == basename_start && range.end == doc_name.len() as u32 {
        weights.base
    } else if range.start == basename_start || range.end == doc_name.len() as u32 {
        weights.edge_base
    } else if range.start >= basename_start && basename_len > 0 {
        weights.inner_base
    } else {
        0.0
    }
}

/// Classifies a content-line match against its enclosing symbol section
/// (spec.md §4.5: "Symbol", "EdgeSymbol", "OverlapSymbol"); `None` when the
/// line carries no symbol association (plain content match).
fn symbol_term(weights: &Weights, section: Option<&SymbolSection>, range: ByteRange) -> f64 {
    let Some(section) = section else { return 0.0 };
    if range.start == section.start && range.end == section.end {
        weights.symbol
    } else if range.start == section.start || range.end == section.end {
        weights.edge_symbol
    } else {
        weights.overlap_symbol
    }
}

/// Scores one content line's matches. `line_text` must be the raw content
/// bytes of the line (used for word-boundary classification); `symbol`, if
/// present, is the symbol section the evaluator associated with this line
/// (spec.md §4.4: `SymbolSubstrMatchTree`/hydration).
pub fn score_content_line(
    weights: &Weights,
    line: &LineMatch,
    line_text: &[u8],
    symbol: Option<&SymbolSection>,
) -> f64 {
    let mut score = 0.0;
    for range in &line.ranges {
        let local = ByteRange {
            start: range.start - line.line_start,
            end: range.end - line.line_start,
        };
        score += word_match_term(weights, line_text, local);
        score += symbol_term(weights, symbol, *range);
    }
    if line.ranges.len() > 1 {
        score *= weights.match_multiplier;
    }
    score += weights.line_order_factor / (1.0 + line.line_number as f64);
    score
}

/// Scores a file-name match (spec.md §4.5: basename terms apply here, word
/// terms do not since a file name has no "line" of surrounding prose).
pub fn score_file_name_match(weights: &Weights, doc_name: &str, range: ByteRange) -> f64 {
    basename_term(weights, doc_name, range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_word_beats_partial_word() {
        let weights = Weights::default();
        let text = b"a needle b";
        let word = ByteRange { start: 2, end: 8 };
        let partial = ByteRange { start: 0, end: 8 };
        assert!(word_match_term(&weights, text, word) > word_match_term(&weights, text, partial));
    }

    #[test]
    fn exact_basename_beats_inner_basename() {
        let weights = Weights::default();
        let exact = ByteRange { start: 4, end: 11 };
        let inner = ByteRange { start: 5, end: 9 };
        assert!(
            basename_term(&weights, "src/needle.rs", exact)
                > basename_term(&weights, "src/needle.rs", inner)
        );
    }

    #[test]
    fn exact_symbol_beats_overlap_symbol() {
        let weights = Weights::default();
        let section = SymbolSection {
            start: 10,
            end: 16,
            kind: "func".into(),
            parent: None,
            name: "foo".into(),
        };
        let exact = ByteRange { start: 10, end: 16 };
        let overlap = ByteRange { start: 12, end: 14 };
        assert!(
            symbol_term(&weights, Some(&section), exact)
                > symbol_term(&weights, Some(&section), overlap)
        );
    }
}
