//! Shared result types the evaluator produces and `ranking` consumes
//! (spec.md §4.4 "Match tree evaluation").

/// The four evaluator cost tiers (spec.md §4.3): cheaper tiers are tried
/// first so an `And` can short-circuit without ever reaching the expensive
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CostTier {
    /// Decided without looking at the shard at all (`Const`).
    Const,
    /// Decided from small per-document arrays already resident in memory
    /// (branch mask, language, repo id, category).
    Memory,
    /// Decided from trigram postings, narrowing to a small candidate set
    /// before any byte scanning happens.
    Content,
    /// Requires running a compiled regex over a candidate's bytes.
    Regexp,
}

/// One match location within a document's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u32,
    pub end: u32,
}

/// A single line's matches, with byte offsets relative to the document
/// content buffer (not the line) so callers can slice directly into
/// `ShardContent::doc_content` (spec.md §4.4: "visit_matches collects
/// `(line, byte range)` pairs").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub line_number: u32,
    pub line_start: u32,
    pub line_end: u32,
    pub ranges: Vec<ByteRange>,
    /// Set when this line's match falls inside a symbol section.
    pub symbol_index: Option<usize>,
}

/// Everything the evaluator found in one document, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct DocMatches {
    pub lines: Vec<LineMatch>,
    /// File name match ranges, kept separate from content lines since they
    /// score differently (spec.md §5).
    pub file_name_ranges: Vec<ByteRange>,
    /// Accumulated `Boost{factor}` multiplier (spec.md §4.2 item 11):
    /// `And` multiplies children's boosts together, `Or` takes the max of
    /// the matching children's. `ranking` multiplies the final score by
    /// this before truncating.
    pub boost: f64,
}

impl Default for DocMatches {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            file_name_ranges: Vec::new(),
            boost: 1.0,
        }
    }
}

impl DocMatches {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.file_name_ranges.is_empty()
    }

    pub fn merge(&mut self, other: DocMatches) {
        self.lines.extend(other.lines);
        self.file_name_ranges.extend(other.file_name_ranges);
    }

    /// Sorts each line's ranges and the line list itself by
    /// `(line_number, start, end)` and removes exact duplicates, so a
    /// `NoVisit` prefilter sharing an `And` with a `Regexp` leaf (spec.md
    /// §4.3) can't leave the same span reported twice.
    pub fn sort_and_dedup(&mut self) {
        for line in &mut self.lines {
            line.ranges.sort_by_key(|r| (r.start, r.end));
            line.ranges.dedup();
        }
        self.lines.sort_by_key(|l| l.line_number);
        self.lines.dedup_by(|a, b| {
            if a.line_number != b.line_number {
                return false;
            }
            b.ranges.extend(a.ranges.drain(..));
            b.ranges.sort_by_key(|r| (r.start, r.end));
            b.ranges.dedup();
            true
        });
        self.file_name_ranges.sort_by_key(|r| (r.start, r.end));
        self.file_name_ranges.dedup();
    }
}
