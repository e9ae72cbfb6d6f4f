//! Final sort and truncation (spec.md §4.5 "Sort"): "files by descending
//! score, then by (repo name, document id) as deterministic tiebreaker.
//! Truncation honors max_doc_display_count and max_match_display_count
//! (spreading the budget across files and chunks proportionally)."

use crate::file_score::ScoredFile;
use itertools::Itertools;

pub fn sort_files(mut files: Vec<ScoredFile>) -> Vec<ScoredFile> {
    files.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.repo_name.cmp(&b.repo_name))
            .then_with(|| a.doc.cmp(&b.doc))
    });
    files
}

/// Truncates a sorted file list to at most `max_doc_display_count` files,
/// and within each kept file caps its match count so the total number of
/// displayed chunks across all kept files stays within
/// `max_match_display_count`, spread proportionally to each file's share of
/// the total matches (spec.md: "spreading the budget across files and
/// chunks proportionally").
pub fn truncate(
    files: Vec<ScoredFile>,
    max_doc_display_count: Option<usize>,
    max_match_display_count: Option<usize>,
) -> Vec<ScoredFile> {
    let mut files = sort_files(files);
    if let Some(max_docs) = max_doc_display_count {
        files.truncate(max_docs);
    }
    let Some(max_matches) = max_match_display_count else {
        return files;
    };
    let total_matches: usize = files.iter().map(|f| f.matches.lines.len().max(1)).sum();
    if total_matches <= max_matches || total_matches == 0 {
        return files;
    }
    let share = max_matches as f64 / total_matches as f64;
    files
        .into_iter()
        .map(|mut f| {
            let keep = ((f.matches.lines.len().max(1) as f64 * share).ceil() as usize).max(1);
            f.matches.lines = f.matches.lines.into_iter().take(keep).collect_vec();
            f
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_engine::DocMatches;

    fn file(repo: &str, doc: u32, score: f64) -> ScoredFile {
        ScoredFile {
            doc,
            repo_name: repo.into(),
            score,
            matches: DocMatches::default(),
        }
    }

    #[test]
    fn sorts_by_descending_score_then_repo_then_doc() {
        let files = vec![file("b", 0, 1.0), file("a", 1, 2.0), file("a", 0, 2.0)];
        let sorted = sort_files(files);
        assert_eq!(sorted[0].doc, 0);
        assert_eq!(sorted[0].repo_name, "a");
        assert_eq!(sorted[1].doc, 1);
        assert_eq!(sorted[2].repo_name, "b");
    }

    #[test]
    fn truncate_caps_doc_count() {
        let files = vec![file("a", 0, 3.0), file("a", 1, 2.0), file("a", 2, 1.0)];
        let truncated = truncate(files, Some(2), None);
        assert_eq!(truncated.len(), 2);
    }
}
