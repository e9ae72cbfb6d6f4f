//! Match-tree construction and evaluation (spec.md §4.3, §4.4): compiles a
//! `query_lang::Q` against a loaded shard and runs it.

mod combinators;
mod compile;
mod error;
mod evaluator;
mod leaves;
mod matcher;
mod types;

pub use compile::compile;
pub use error::{MatchError, Result};
pub use evaluator::{search_shard, visit_matches, ShardMatch};
pub use matcher::{BoxMatcher, Matcher};
pub use types::{ByteRange, CostTier, DocMatches, LineMatch};

#[cfg(test)]
mod tests {
    use super::*;
    use query_lang::Q;
    use shard_format::{Document, Repository, ShardContent};

    fn shard_with(files: &[(&str, &str)]) -> ShardContent {
        let repo = Repository::new(0, "r");
        let mut sc = ShardContent::default();
        sc.repositories.push(repo);
        for (name, content) in files {
            let doc = Document::new(*name, content.as_bytes().to_vec());
            sc.push_document(0, 0, &doc);
        }
        sc
    }

    #[test]
    fn and_of_two_substrings_short_circuits() {
        let shard = shard_with(&[("a.rs", "foo bar"), ("b.rs", "foo only")]);
        let q = Q::and(vec![Q::substring("foo", true), Q::substring("bar", true)]);
        let q = query_lang::simplify(q);
        let cache = query_cache::DocMatchTreeCache::new(0);
        let matcher = compile(&q, &shard, &cache).unwrap();
        let token = search_cancel::CancellationToken::new(1);
        let results = search_shard(&matcher, &shard, &token).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc, 0);
    }

    #[test]
    fn or_of_substrings_finds_both_docs() {
        let shard = shard_with(&[("a.rs", "alpha"), ("b.rs", "beta"), ("c.rs", "gamma")]);
        let q = Q::or(vec![Q::substring("alpha", true), Q::substring("beta", true)]);
        let cache = query_cache::DocMatchTreeCache::new(0);
        let matcher = compile(&q, &shard, &cache).unwrap();
        let token = search_cancel::CancellationToken::new(2);
        let results = search_shard(&matcher, &shard, &token).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn not_excludes_matching_doc() {
        let shard = shard_with(&[("a.rs", "foo"), ("b.rs", "bar")]);
        let q = Q::and(vec![Q::Const(true), Q::not(Q::substring("foo", true))]);
        let q = query_lang::simplify(q);
        let cache = query_cache::DocMatchTreeCache::new(0);
        let matcher = compile(&q, &shard, &cache).unwrap();
        let token = search_cancel::CancellationToken::new(3);
        let results = search_shard(&matcher, &shard, &token).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc, 1);
        assert!(visit_matches(&results).is_empty());
    }
}
