//! Compiles a [`Q`] against one shard's [`ShardContent`] into an evaluator
//! tree (spec.md §4.3 "Match tree construction").

use crate::combinators::{
    AndLineMatchTree, AndMatcher, BoostMatcher, NoVisitMatcher, NotMatcher, OrMatcher,
};
use crate::error::{MatchError, Result};
use crate::leaves::{ConstMatcher, MemoryMatcher, RegexpMatcher, SubstringMatcher};
use crate::matcher::{BoxMatcher, Matcher};
use crate::types::{ByteRange, CostTier, DocMatches, LineMatch};
use query_cache::DocMatchTreeCache;
use query_lang::{DocKind, Q};
use regex::bytes::RegexBuilder;
use shard_format::{DocumentCategory, ShardContent};
use std::collections::BTreeSet;

pub fn compile(query: &Q, shard: &ShardContent, cache: &DocMatchTreeCache) -> Result<BoxMatcher> {
    Ok(match query {
        Q::Const(b) => Box::new(ConstMatcher(*b)),

        Q::And(parts) => {
            let mut children: Vec<BoxMatcher> =
                parts.iter().map(|p| compile(p, shard, cache)).collect::<Result<_>>()?;
            children.sort_by_key(|c| c.cost());
            // Children are sorted cheapest-first, so same-tier Content
            // leaves form one contiguous run between the Memory/Const
            // prefix and the Regexp suffix.
            let split = children.partition_point(|c| c.cost() < CostTier::Content);
            let run_len = children[split..]
                .iter()
                .take_while(|c| c.cost() == CostTier::Content)
                .count();
            if run_len >= 2 {
                let line_children: Vec<BoxMatcher> = children.drain(split..split + run_len).collect();
                children.insert(split, Box::new(AndLineMatchTree { children: line_children }));
            }
            Box::new(AndMatcher { children })
        }

        Q::Or(parts) => {
            let children = parts.iter().map(|p| compile(p, shard, cache)).collect::<Result<_>>()?;
            Box::new(OrMatcher { children })
        }

        Q::Not(inner) => Box::new(NotMatcher {
            inner: compile(inner, shard, cache)?,
        }),

        Q::Substring {
            pattern,
            case_sensitive,
            content,
            file_name,
            word_boundary,
        } => Box::new(SubstringMatcher {
            pattern: pattern.clone(),
            case_sensitive: case_sensitive.resolve(pattern),
            content: *content,
            file_name: *file_name,
            word_boundary: *word_boundary,
        }),

        Q::Regexp {
            pattern,
            case_sensitive,
            content,
            file_name,
        } => {
            let case_sensitive = case_sensitive.resolve(pattern);
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(MatchError::Regex)?;
            Box::new(RegexpMatcher {
                regex,
                content: *content,
                file_name: *file_name,
            })
        }

        Q::Symbol(inner, exact) => {
            let (pattern, case_sensitive) = symbol_pattern(inner);
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(MatchError::Regex)?;
            Box::new(SymbolMatcher { regex, exact: *exact })
        }

        Q::Branch { pattern, exact } => {
            let pattern = pattern.clone();
            let exact = *exact;
            memory(move |shard, doc| {
                let repo_id = shard.repo_index[doc as usize];
                let Some(repo) = shard.repository(repo_id) else {
                    return false;
                };
                let mask = shard.branch_masks[doc as usize];
                if exact {
                    repo.branch_bit(&pattern).is_some_and(|bit| mask & (1 << bit) != 0)
                } else {
                    repo.branches
                        .iter()
                        .enumerate()
                        .any(|(bit, b)| b.name.contains(&pattern) && mask & (1 << bit) != 0)
                }
            })
        }

        Q::Language(lang) => {
            let lang = lang.clone();
            memory(move |shard, doc| shard.language_codes[doc as usize].eq_ignore_ascii_case(&lang))
        }

        Q::Repo(substr) => {
            let ids = repo_ids_matching(shard, |r| r.name.contains(substr.as_str()));
            memory_in_repo_set(ids)
        }

        Q::RepoRegexp(pattern) => {
            let re = regex::Regex::new(pattern).map_err(MatchError::Regex)?;
            let ids = repo_ids_matching(shard, |r| re.is_match(&r.name));
            memory_in_repo_set(ids)
        }

        Q::RepoSet(names) => {
            let ids = repo_ids_matching(shard, |r| names.contains(&r.name));
            memory_in_repo_set(ids)
        }

        Q::RepoIds(ids) => {
            let ids = ids.clone();
            memory_in_repo_set(ids)
        }

        Q::BranchesRepos(pairs) => {
            let pairs = pairs.clone();
            memory(move |shard, doc| {
                let repo_id = shard.repo_index[doc as usize];
                pairs.iter().any(|p| {
                    if !p.repo_ids.contains(&repo_id) {
                        return false;
                    }
                    shard
                        .repository(repo_id)
                        .and_then(|r| r.branch_bit(&p.branch))
                        .is_some_and(|bit| shard.branch_masks[doc as usize] & (1 << bit) != 0)
                })
            })
        }

        Q::FileNameSet(names) => {
            let names = names.clone();
            memory(move |shard, doc| names.contains(&shard.doc_names[doc as usize]))
        }

        Q::Type(kind) => {
            let kind = *kind;
            memory(move |shard, doc| category_matches(shard.categories[doc as usize], kind))
        }

        Q::Meta { field, regex } => {
            let field = field.clone();
            let pattern = regex.clone();
            let re = regex::Regex::new(&pattern).map_err(MatchError::Regex)?;
            let doc_count = shard.doc_count() as u32;
            let bitset = cache.get_or_compute(&field, &pattern, || {
                (0..doc_count)
                    .map(|doc| {
                        let repo_id = shard.repo_index[doc as usize];
                        shard
                            .repository(repo_id)
                            .and_then(|r| r.metadata.get(&field))
                            .is_some_and(|v| re.is_match(v))
                    })
                    .collect()
            });
            memory(move |_shard, doc| bitset[doc as usize])
        }

        Q::RawConfig(mask) => {
            let mask = *mask;
            memory(move |shard, doc| {
                let repo_id = shard.repo_index[doc as usize];
                shard
                    .repository(repo_id)
                    .is_some_and(|r| (r.raw_config.bits() as u64) & mask == mask)
            })
        }

        Q::Boost { query, factor } => Box::new(BoostMatcher {
            inner: compile(query, shard, cache)?,
            factor: *factor,
        }),

        Q::NoVisit(inner) => Box::new(NoVisitMatcher {
            inner: compile(inner, shard, cache)?,
        }),
    })
}

fn memory<F>(f: F) -> BoxMatcher
where
    F: Fn(&ShardContent, u32) -> bool + Send + Sync + 'static,
{
    Box::new(MemoryMatcher { predicate: f })
}

fn memory_in_repo_set(ids: BTreeSet<u32>) -> BoxMatcher {
    memory(move |shard, doc| ids.contains(&shard.repo_index[doc as usize]))
}

fn repo_ids_matching(shard: &ShardContent, pred: impl Fn(&shard_format::Repository) -> bool) -> BTreeSet<u32> {
    shard.repositories.iter().filter(|r| pred(r)).map(|r| r.id).collect()
}

fn category_matches(category: DocumentCategory, kind: DocKind) -> bool {
    matches!(
        (category, kind),
        (DocumentCategory::Normal, DocKind::Normal)
            | (DocumentCategory::Test, DocKind::Test)
            | (DocumentCategory::Generated, DocKind::Generated)
            | (DocumentCategory::Vendored, DocKind::Vendored)
    )
}

/// Extracts the raw pattern text and resolved case sensitivity from a
/// `sym:` leaf's inner query, so `SymbolMatcher` can test it directly
/// against each symbol section's own text rather than the whole document
/// stream. A `Substring` inner pattern is a literal, so it's escaped before
/// being used as a regex.
fn symbol_pattern(q: &Q) -> (String, bool) {
    match q {
        Q::Regexp { pattern, case_sensitive, .. } => (pattern.clone(), case_sensitive.resolve(pattern)),
        Q::Substring { pattern, case_sensitive, .. } => {
            (regex::escape(pattern), case_sensitive.resolve(pattern))
        }
        _ => (String::new(), true),
    }
}

/// Matches a `sym:` query against each document's symbol sections directly
/// (spec.md §4.2 item 7), not against the whole content stream: an anchored
/// pattern (`^...$`, stripped to `exact` by the simplifier) must match a
/// section's full text, e.g. `sym:^foo$` matches a symbol named exactly
/// "foo" but `sym:^fo$` does not; an unanchored pattern like `.*` need only
/// be found somewhere in the section, which for `.*` means every section
/// matches exactly once.
struct SymbolMatcher {
    regex: regex::bytes::Regex,
    exact: bool,
}

impl Matcher for SymbolMatcher {
    fn cost(&self) -> CostTier {
        CostTier::Regexp
    }

    fn next_doc(&self, shard: &ShardContent, from: u32) -> Option<u32> {
        if from < shard.doc_count() as u32 {
            Some(from)
        } else {
            None
        }
    }

    fn doc_matches(
        &self,
        shard: &ShardContent,
        doc: u32,
        cancel: &search_cancel::CancellationToken,
    ) -> Result<Option<DocMatches>> {
        cancel.check()?;
        if shard.skipped[doc as usize] {
            return Ok(None);
        }
        let content = shard.doc_content(doc);
        let sections = &shard.symbol_sections[doc as usize];
        let mut lines = Vec::new();
        for (idx, section) in sections.iter().enumerate() {
            let (start, end) = (section.start as usize, section.end as usize);
            if start > end || end > content.len() {
                continue;
            }
            let text = &content[start..end];
            let matched = if self.exact {
                self.regex
                    .find(text)
                    .is_some_and(|m| m.start() == 0 && m.end() == text.len())
            } else {
                self.regex.is_match(text)
            };
            if !matched {
                continue;
            }
            let line_number = content[..start].iter().filter(|&&b| b == b'\n').count() as u32 + 1;
            lines.push(LineMatch {
                line_number,
                line_start: section.start,
                line_end: section.end,
                ranges: vec![ByteRange {
                    start: section.start,
                    end: section.end,
                }],
                symbol_index: Some(idx),
            });
        }
        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DocMatches {
                lines,
                file_name_ranges: Vec::new(),
                boost: 1.0,
            }))
        }
    }
}
