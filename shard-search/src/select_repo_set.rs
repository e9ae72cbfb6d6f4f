//! Repo-set pre-filtering (spec.md §4.6 "select_repo_set"): "if the
//! top-level query is And with a RepoSet/RepoIDs/BranchesRepos child, drop
//! shards whose repo set is disjoint from the query set, and if all
//! remaining shards are fully contained in the set, rewrite the child to
//! Const(true)... before running the per-shard search."

use crate::ranked_shard::RankedShard;
use query_lang::{BranchRepos, Q};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Filters `shards` against a repo-scoping top-level `And` child and, when
/// the filter makes the child redundant, simplifies it away so per-shard
/// matchers don't re-check what the scheduler already guaranteed.
pub fn select_repo_set(query: Q, shards: Vec<Arc<RankedShard>>) -> (Q, Vec<Arc<RankedShard>>) {
    let Q::And(mut parts) = query else {
        return (query, shards);
    };
    let Some(idx) = parts.iter().position(is_repo_scope) else {
        return (Q::And(parts), shards);
    };
    let constraint = parts[idx].clone();

    let filtered: Vec<Arc<RankedShard>> = shards
        .into_iter()
        .filter(|shard| !is_disjoint(shard, &constraint))
        .collect();

    if filtered.iter().all(|shard| is_fully_contained(shard, &constraint)) {
        parts[idx] = rewrite(&constraint);
    }
    (Q::And(parts), filtered)
}

fn is_repo_scope(q: &Q) -> bool {
    matches!(q, Q::RepoSet(_) | Q::RepoIds(_) | Q::BranchesRepos(_))
}

fn constrained_ids(pairs: &[BranchRepos]) -> BTreeSet<u32> {
    pairs.iter().flat_map(|p| p.repo_ids.iter().copied()).collect()
}

fn is_disjoint(shard: &RankedShard, constraint: &Q) -> bool {
    match constraint {
        Q::RepoSet(names) => !shard.repo_names.iter().any(|name| names.contains(name)),
        Q::RepoIds(ids) => shard.repo_ids.is_disjoint(ids),
        Q::BranchesRepos(pairs) => shard.repo_ids.is_disjoint(&constrained_ids(pairs)),
        _ => false,
    }
}

fn is_fully_contained(shard: &RankedShard, constraint: &Q) -> bool {
    match constraint {
        Q::RepoSet(names) => shard.repo_names.iter().all(|name| names.contains(name)),
        Q::RepoIds(ids) => shard.repo_ids.iter().all(|id| ids.contains(id)),
        Q::BranchesRepos(pairs) => {
            let ids = constrained_ids(pairs);
            shard.repo_ids.iter().all(|id| ids.contains(id))
        }
        _ => false,
    }
}

/// spec.md §4.6: "for BranchesRepos where every repo wants identical
/// branches, rewrite to a list of Branch queries." Interpreted here as: if
/// every pair names the same branch, the whole constraint degrades to that
/// one `Branch` leaf (an `Or` of one element); see DESIGN.md for the
/// reasoning when pairs name more than one distinct branch.
fn rewrite(constraint: &Q) -> Q {
    match constraint {
        Q::BranchesRepos(pairs) if all_same_branch(pairs) => Q::Branch {
            pattern: pairs[0].branch.clone(),
            exact: true,
        },
        _ => Q::Const(true),
    }
}

fn all_same_branch(pairs: &[BranchRepos]) -> bool {
    !pairs.is_empty() && pairs.windows(2).all(|w| w[0].branch == w[1].branch)
}
