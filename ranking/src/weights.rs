//! Additive scoring constants (spec.md §4.5). The spec names the terms
//! ("WordMatch", "Base", "Symbol", …) but leaves their numeric weights
//! unspecified; the values below are a considered, internally-consistent
//! choice (word > partial-word, basename-exact > basename-edge >
//! basename-inner, symbol > edge-symbol > overlap-symbol) recorded as an
//! Open Question decision in DESIGN.md rather than guessed silently.

#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub word_match: f64,
    pub partial_word_match: f64,
    pub base: f64,
    pub edge_base: f64,
    pub inner_base: f64,
    pub symbol: f64,
    pub edge_symbol: f64,
    pub overlap_symbol: f64,
    /// Per-match multiplier applied once per line that adds more than one
    /// match (spec.md §4.5: "and by match multiplier").
    pub match_multiplier: f64,
    /// Earlier lines win a small fraction of a point as a tiebreaker
    /// (spec.md §4.5: "line-order factor").
    pub line_order_factor: f64,
    pub score_offset: f64,
    pub atom_count_boost: f64,
    pub rank_factor: f64,
    pub file_order_factor: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            word_match: 50.0,
            partial_word_match: 40.0,
            base: 7000.0,
            edge_base: 6000.0,
            inner_base: 5000.0,
            symbol: 3000.0,
            edge_symbol: 2000.0,
            overlap_symbol: 1000.0,
            match_multiplier: 1.0,
            line_order_factor: 0.1,
            score_offset: 1.0,
            atom_count_boost: 2.0,
            rank_factor: 0.5,
            file_order_factor: -1e-6,
        }
    }
}

/// Per-category additive term (spec.md §4.5: "plus a per-kind/language
/// additive term"); test/generated/vendored content ranks below ordinary
/// source, mirroring the builder's own within-shard ranking policy
/// (spec.md §4.1 item 5).
pub fn category_term(category: shard_format::DocumentCategory) -> f64 {
    use shard_format::DocumentCategory::*;
    match category {
        Normal => 0.0,
        Test => -500.0,
        Generated => -1000.0,
        Vendored => -2000.0,
    }
}
