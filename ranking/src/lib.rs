//! Scoring and ranking (spec.md §4.5): per-line and per-file score
//! composition, the optional BM25 alternative, and final sort/truncation.

mod bm25;
mod file_score;
mod line_score;
mod sort;
mod weights;

pub use bm25::{file_bm25, line_bm25, AVG_LINE_LEN, B, FILE_OR_SYMBOL_WEIGHT, K1};
pub use file_score::{score_shard_match, ScoredFile};
pub use line_score::{score_content_line, score_file_name_match};
pub use sort::{sort_files, truncate};
pub use weights::{category_term, Weights};
