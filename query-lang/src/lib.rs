//! The query algebra and its simplifier (spec.md §4.2).

mod q;
mod regex_lower;
mod simplify;

pub use q::{BranchRepos, CaseSensitivity, DocKind, Q};
pub use regex_lower::{lower_regex, Lowered};
pub use simplify::simplify;
