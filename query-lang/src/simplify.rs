//! Query simplification (spec.md §4.2 "Simplifier"): constant folding,
//! flattening, case normalization, symbol anchor stripping, and regex
//! lowering. Grounded on `cardinal-syntax::optimize_query`'s shape (a
//! separate pass from parsing, returning a new tree, flattening nested
//! `And`/`Or` and eliding identity elements) generalized from Everything's
//! AST to the substring/regexp/meta query algebra.

use crate::q::{CaseSensitivity, Q};
use crate::regex_lower::{is_empty_match_regex, lower_regex, Lowered};

/// Applies every simplification rule to `query` and returns the normalized
/// tree. Idempotent: simplifying an already-simplified query returns an
/// identical tree.
///
/// ```
/// use query_lang::{simplify, Q};
/// let q = Q::and(vec![Q::Const(true), Q::substring("foo", false)]);
/// assert_eq!(simplify(q), Q::substring("foo", false));
/// ```
pub fn simplify(query: Q) -> Q {
    let q = strip_symbol_anchors(query);
    let q = normalize_case(q);
    let q = lower_regexps(q);
    fold(q)
}

fn fold(expr: Q) -> Q {
    match expr {
        Q::And(parts) => fold_and(parts.into_iter().map(fold).collect()),
        Q::Or(parts) => fold_or(parts.into_iter().map(fold).collect()),
        Q::Not(inner) => match fold(*inner) {
            Q::Const(b) => Q::Const(!b),
            Q::Not(doubly) => *doubly,
            other => Q::Not(Box::new(other)),
        },
        Q::Boost { query, factor } => Q::Boost {
            query: Box::new(fold(*query)),
            factor,
        },
        Q::Symbol(inner, exact) => Q::Symbol(Box::new(fold(*inner)), exact),
        Q::NoVisit(inner) => Q::NoVisit(Box::new(fold(*inner))),
        Q::Substring { ref pattern, .. } if pattern.is_empty() => Q::Const(true),
        Q::Regexp { ref pattern, .. } if is_empty_match_regex(pattern) => Q::Const(true),
        Q::Branch { ref pattern, .. } if pattern.is_empty() => Q::Const(true),
        Q::RepoSet(ref names) if names.is_empty() => Q::Const(true),
        other => other,
    }
}

/// `And` identity is `Const(true)`; any `Const(false)` operand annihilates
/// the whole conjunction (spec.md §4.2 item 2: "constant folding").
fn fold_and(parts: Vec<Q>) -> Q {
    let mut flat = Vec::with_capacity(parts.len());
    for p in parts {
        match p {
            Q::Const(true) => {}
            Q::Const(false) => return Q::Const(false),
            Q::And(nested) => flat.extend(nested),
            other => flat.push(other),
        }
    }
    match flat.len() {
        0 => Q::Const(true),
        1 => flat.pop().unwrap(),
        _ => Q::And(flat),
    }
}

/// `Or` identity is `Const(false)`; any `Const(true)` operand short-circuits
/// the whole disjunction to `Const(true)`.
fn fold_or(parts: Vec<Q>) -> Q {
    let mut flat = Vec::with_capacity(parts.len());
    for p in parts {
        match p {
            Q::Const(false) => {}
            Q::Const(true) => return Q::Const(true),
            Q::Or(nested) => flat.extend(nested),
            other => flat.push(other),
        }
    }
    match flat.len() {
        0 => Q::Const(false),
        1 => flat.pop().unwrap(),
        _ => Q::Or(flat),
    }
}

/// Strips a leading `^`/trailing `$` from a `sym:` leaf's inner regex and
/// records that stripping on the node as `exact` (spec.md §4.2 item 7:
/// "`^foo$` requires the match to span the whole symbol section; without
/// anchors a match anywhere inside the section is enough"). Runs before
/// `lower_regexps` so the bare pattern string is still available to inspect.
fn strip_symbol_anchors(expr: Q) -> Q {
    match expr {
        Q::Symbol(inner, _) => {
            let inner = strip_symbol_anchors(*inner);
            let (inner, exact) = match inner {
                Q::Regexp {
                    pattern,
                    case_sensitive,
                    content,
                    file_name,
                } => match anchor_stripped(&pattern) {
                    Some(stripped) => (
                        Q::Regexp {
                            pattern: stripped,
                            case_sensitive,
                            content,
                            file_name,
                        },
                        true,
                    ),
                    None => (
                        Q::Regexp {
                            pattern,
                            case_sensitive,
                            content,
                            file_name,
                        },
                        false,
                    ),
                },
                other => (other, false),
            };
            Q::Symbol(Box::new(inner), exact)
        }
        Q::And(parts) => Q::And(parts.into_iter().map(strip_symbol_anchors).collect()),
        Q::Or(parts) => Q::Or(parts.into_iter().map(strip_symbol_anchors).collect()),
        Q::Not(inner) => Q::Not(Box::new(strip_symbol_anchors(*inner))),
        Q::Boost { query, factor } => Q::Boost {
            query: Box::new(strip_symbol_anchors(*query)),
            factor,
        },
        other => other,
    }
}

fn anchor_stripped(pattern: &str) -> Option<String> {
    let inner = pattern.strip_prefix('^')?.strip_suffix('$')?;
    Some(inner.to_string())
}

/// Lowercases case-insensitive substring patterns once here so the evaluator
/// never repeats the fold per-candidate, and resolves `case:auto` to a
/// concrete `Yes`/`No` so downstream passes never see `Auto` again (spec.md
/// §4.2 item 4).
fn normalize_case(expr: Q) -> Q {
    match expr {
        Q::Substring {
            pattern,
            case_sensitive,
            content,
            file_name,
            word_boundary,
        } => {
            let resolved = case_sensitive.resolve(&pattern);
            let pattern = if resolved { pattern } else { pattern.to_lowercase() };
            Q::Substring {
                pattern,
                case_sensitive: CaseSensitivity::from(resolved),
                content,
                file_name,
                word_boundary,
            }
        }
        Q::Regexp {
            pattern,
            case_sensitive,
            content,
            file_name,
        } => {
            let resolved = case_sensitive.resolve(&pattern);
            Q::Regexp {
                pattern,
                case_sensitive: CaseSensitivity::from(resolved),
                content,
                file_name,
            }
        }
        Q::And(parts) => Q::And(parts.into_iter().map(normalize_case).collect()),
        Q::Or(parts) => Q::Or(parts.into_iter().map(normalize_case).collect()),
        Q::Not(inner) => Q::Not(Box::new(normalize_case(*inner))),
        Q::Symbol(inner, exact) => Q::Symbol(Box::new(normalize_case(*inner)), exact),
        Q::NoVisit(inner) => Q::NoVisit(Box::new(normalize_case(*inner))),
        Q::Boost { query, factor } => Q::Boost {
            query: Box::new(normalize_case(*query)),
            factor,
        },
        other => other,
    }
}

/// Replaces every `Regexp` leaf with `And([NoVisit(<trigram pre-filter>),
/// Regexp])` when a required-substring pre-filter can be extracted (spec.md
/// §4.2 item 6: "regex lowering... regex-to-trigram approximation"), or with
/// a plain `Substring` when the whole pattern turns out to be a
/// word-anchored literal (the word-regex fast path). The pre-filter is
/// wrapped in `NoVisit` so its own matched ranges (which only approximate
/// the real regex) never leak into the final result alongside the regex's.
fn lower_regexps(expr: Q) -> Q {
    match expr {
        Q::Regexp {
            pattern,
            case_sensitive,
            content,
            file_name,
        } => {
            let cs = case_sensitive.resolve(&pattern);
            match lower_regex(&pattern, cs) {
                Lowered::WordLiteral(literal) => Q::Substring {
                    pattern: if cs { literal } else { literal.to_lowercase() },
                    case_sensitive: CaseSensitivity::from(cs),
                    content,
                    file_name,
                    word_boundary: true,
                },
                Lowered::PreFilter(filter) => Q::And(vec![
                    Q::NoVisit(Box::new(filter)),
                    Q::Regexp {
                        pattern,
                        case_sensitive,
                        content,
                        file_name,
                    },
                ]),
                Lowered::None => Q::Regexp {
                    pattern,
                    case_sensitive,
                    content,
                    file_name,
                },
            }
        }
        // The word-literal fast path is disabled inside `Symbol`: a bare
        // substring leaf loses the anchor/exact bookkeeping `SymbolMatcher`
        // needs, so only the pre-filter extraction runs here.
        Q::Symbol(inner, exact) => Q::Symbol(Box::new(lower_regexps_inside_symbol(*inner)), exact),
        Q::And(parts) => Q::And(parts.into_iter().map(lower_regexps).collect()),
        Q::Or(parts) => Q::Or(parts.into_iter().map(lower_regexps).collect()),
        Q::Not(inner) => Q::Not(Box::new(lower_regexps(*inner))),
        Q::NoVisit(inner) => Q::NoVisit(Box::new(lower_regexps(*inner))),
        Q::Boost { query, factor } => Q::Boost {
            query: Box::new(lower_regexps(*query)),
            factor,
        },
        other => other,
    }
}

fn lower_regexps_inside_symbol(expr: Q) -> Q {
    match expr {
        Q::Regexp {
            pattern,
            case_sensitive,
            content,
            file_name,
        } => {
            let cs = case_sensitive.resolve(&pattern);
            match lower_regex(&pattern, cs) {
                Lowered::PreFilter(filter) => Q::And(vec![
                    Q::NoVisit(Box::new(filter)),
                    Q::Regexp {
                        pattern,
                        case_sensitive,
                        content,
                        file_name,
                    },
                ]),
                Lowered::WordLiteral(_) | Lowered::None => Q::Regexp {
                    pattern,
                    case_sensitive,
                    content,
                    file_name,
                },
            }
        }
        Q::And(parts) => Q::And(parts.into_iter().map(lower_regexps_inside_symbol).collect()),
        Q::Or(parts) => Q::Or(parts.into_iter().map(lower_regexps_inside_symbol).collect()),
        Q::Not(inner) => Q::Not(Box::new(lower_regexps_inside_symbol(*inner))),
        other => other,
    }
}
