//! Regex analysis used by the simplifier (spec.md §4.2 item 6): detecting
//! the word-anchored literal fast path and extracting a required-substring
//! pre-filter from a regex's HIR so trigram lookups can narrow candidates
//! before the full regex runs.

use crate::q::{CaseSensitivity, Q};
use regex_syntax::hir::{Hir, HirKind, Literal};
use regex_syntax::Parser;

/// Whether `pattern` matches only the empty string (spec.md §4.2's fold
/// rule for a `Regexp` leaf whose AST is `OpEmptyMatch`). An unparseable
/// pattern is left for `compile` to reject, not folded away here.
pub fn is_empty_match_regex(pattern: &str) -> bool {
    match Parser::new().parse(pattern) {
        Ok(hir) => matches!(hir.kind(), HirKind::Empty),
        Err(_) => false,
    }
}

pub enum Lowered {
    /// The whole pattern is `\bLITERAL\b` with no other metacharacters;
    /// degrade straight to a word-bounded substring match.
    WordLiteral(String),
    /// A query that is a *necessary* (not sufficient) condition for the
    /// regex to match — safe to AND alongside the original `Regexp` leaf.
    PreFilter(Q),
    /// Nothing could be extracted; the evaluator must use the regex tier
    /// directly with no trigram narrowing.
    None,
}

pub fn lower_regex(pattern: &str, case_sensitive: bool) -> Lowered {
    let Ok(hir) = Parser::new().parse(pattern) else {
        return Lowered::None;
    };

    if let Some(literal) = as_word_anchored_literal(pattern) {
        return Lowered::WordLiteral(literal);
    }

    match required_substrings(&hir) {
        Some(req) if !req.literals.is_empty() => {
            Lowered::PreFilter(substrings_to_query(req, case_sensitive))
        }
        _ => Lowered::None,
    }
}

/// `\bLITERAL\b` where `LITERAL` has no other regex metacharacters.
fn as_word_anchored_literal(pattern: &str) -> Option<String> {
    let inner = pattern.strip_prefix("\\b")?.strip_suffix("\\b")?;
    if inner.is_empty() || inner.chars().any(|c| "\\^$.|?*+()[]{}".contains(c)) {
        return None;
    }
    Some(inner.to_string())
}

/// A disjunction of literal requirements: `alternatives[i]` is a set of
/// literal runs that must ALL appear (an AND) for branch `i` of the pattern
/// to match; the overall pattern requires at least one branch's literals
/// (an OR of ANDs). A plain concatenation with no alternation is the
/// single-branch case.
struct Required {
    literals: Vec<Vec<String>>,
}

fn substrings_to_query(req: Required, case_sensitive: bool) -> Q {
    let branches: Vec<Q> = req
        .literals
        .into_iter()
        .filter(|lits| !lits.is_empty())
        .map(|lits| {
            let terms: Vec<Q> = lits
                .into_iter()
                .filter(|l| l.chars().count() >= 3)
                .map(|l| Q::Substring {
                    pattern: l,
                    case_sensitive: CaseSensitivity::from(case_sensitive),
                    content: true,
                    file_name: true,
                    word_boundary: false,
                })
                .collect();
            match terms.len() {
                0 => Q::Const(true),
                1 => terms.into_iter().next().unwrap(),
                _ => Q::And(terms),
            }
        })
        .collect();
    match branches.len() {
        0 => Q::Const(true),
        1 => branches.into_iter().next().unwrap(),
        _ => Q::Or(branches),
    }
}

/// Walks the HIR gathering literal runs required for a match. Returns
/// `None` when the pattern contains a construct (e.g. an unbounded
/// repetition of a non-literal, or a class-heavy alternative) that makes
/// "requires substring X" unsound to assert.
fn required_substrings(hir: &Hir) -> Option<Required> {
    match hir.kind() {
        HirKind::Literal(Literal(bytes)) => {
            let s = String::from_utf8(bytes.to_vec()).ok()?;
            Some(single_branch(vec![s]))
        }
        HirKind::Concat(subs) => {
            let mut lits = Vec::new();
            for sub in subs {
                match sub.kind() {
                    HirKind::Literal(Literal(bytes)) => {
                        let s = String::from_utf8(bytes.to_vec()).ok()?;
                        lits.push(s);
                    }
                    HirKind::Capture(cap) => {
                        if let Some(mut inner) = required_substrings(&cap.sub) {
                            if inner.literals.len() == 1 {
                                lits.append(&mut inner.literals[0]);
                            }
                        }
                    }
                    // Anchors, word boundaries, and empty nodes impose no
                    // substring requirement but don't invalidate siblings.
                    HirKind::Look(_) | HirKind::Empty => {}
                    _ => {
                        // Unknown structure: still sound to keep whatever
                        // literal runs we've already gathered as a
                        // necessary (partial) condition.
                    }
                }
            }
            if lits.is_empty() {
                None
            } else {
                Some(single_branch(lits))
            }
        }
        HirKind::Alternation(subs) => {
            let mut branches = Vec::with_capacity(subs.len());
            for sub in subs {
                let req = required_substrings(sub)?;
                if req.literals.len() != 1 {
                    return None;
                }
                branches.push(req.literals.into_iter().next().unwrap());
            }
            Some(Required { literals: branches })
        }
        HirKind::Repetition(rep) if rep.min >= 1 => required_substrings(&rep.sub),
        HirKind::Capture(cap) => required_substrings(&cap.sub),
        _ => None,
    }
}

fn single_branch(literals: Vec<String>) -> Required {
    Required {
        literals: vec![literals],
    }
}
