//! Compound-shard assembly (spec.md §4.7 "Merge"): "Order input shards by
//! descending first-repo priority. For every live (non-tombstoned) repo, in
//! the order repos appear in each input, call set_repository on a builder,
//! then replay each document... The compound shard's file name is derived
//! deterministically from the set of live repo names."

use crate::replay::reconstruct_document;
use shard_format::ShardContent;
use std::cmp::Ordering;

/// Merges `shards` into one compound [`ShardContent`] (spec.md §3: "a
/// compound shard's file name is `compound-<sha1 ...>`"; naming itself is
/// computed by the caller from [`live_repo_names`] once the merge is
/// written to disk — see `io::write_merged`).
pub fn merge(shards: &[ShardContent]) -> ShardContent {
    let mut ordered: Vec<&ShardContent> = shards.iter().collect();
    ordered.sort_by(|a, b| {
        let pa = a.repositories.first().map(|r| r.priority).unwrap_or(0.0);
        let pb = b.repositories.first().map(|r| r.priority).unwrap_or(0.0);
        pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
    });

    let mut out = ShardContent::default();
    let mut next_repo_id = 0u32;
    for shard in ordered {
        for repo in &shard.repositories {
            if repo.tombstone {
                continue;
            }
            let mut new_repo = repo.clone();
            new_repo.id = next_repo_id;
            out.repositories.push(new_repo.clone());

            for doc in 0..shard.doc_count() as u32 {
                if shard.repo_index[doc as usize] != repo.id {
                    continue;
                }
                if shard.skipped[doc as usize] {
                    out.push_skipped(new_repo.id, &shard.doc_names[doc as usize]);
                } else {
                    let document = reconstruct_document(shard, repo, doc);
                    let mask = new_repo.encode_branch_mask(&document.branches);
                    out.push_document(new_repo.id, mask, &document);
                }
            }
            next_repo_id += 1;
        }
    }
    out
}

/// Live (non-tombstoned) repo names in the order they were assembled by
/// [`merge`], used to derive the compound shard's deterministic file name
/// (spec.md §8 invariant 9: "merging the same set of repos twice produces
/// identical file names").
pub fn live_repo_names(merged: &ShardContent) -> Vec<String> {
    merged
        .repositories
        .iter()
        .filter(|r| !r.tombstone)
        .map(|r| r.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_format::{Document, Repository};

    fn shard_with(repo_name: &str, priority: f64, files: &[(&str, &str)]) -> ShardContent {
        let mut repo = Repository::new(0, repo_name);
        repo.priority = priority;
        repo.add_branch("main", "v1");
        let mut sc = ShardContent::default();
        sc.repositories.push(repo.clone());
        for (name, content) in files {
            let doc = Document::new(*name, content.as_bytes().to_vec())
                .with_branches(["main".to_string()]);
            let mask = repo.encode_branch_mask(&doc.branches);
            sc.push_document(0, mask, &doc);
        }
        sc
    }

    #[test]
    fn merge_two_shards_concatenates_repos_and_docs() {
        let a = shard_with("repoA", 0.5, &[("hello.rs", "fn hello() {}")]);
        let b = shard_with("repoB", 0.9, &[("world.rs", "fn world() {}")]);
        let merged = merge(&[a, b]);
        assert_eq!(merged.repositories.len(), 2);
        // repoB has higher priority, so it's ordered (and assigned ids) first.
        assert_eq!(merged.repositories[0].name, "repoB");
        assert_eq!(merged.repositories[1].name, "repoA");
        assert_eq!(merged.doc_count(), 2);
        assert_eq!(merged.repo_index, vec![0, 1]);
    }

    #[test]
    fn tombstoned_repos_are_dropped() {
        let mut a = shard_with("repoA", 1.0, &[("f.rs", "x")]);
        a.repositories[0].tombstone = true;
        let merged = merge(&[a]);
        assert_eq!(merged.repositories.len(), 0);
        assert_eq!(merged.doc_count(), 0);
    }

    #[test]
    fn merge_name_is_deterministic_for_same_repo_set() {
        let a = shard_with("repoA", 0.5, &[("f.rs", "x")]);
        let b = shard_with("repoB", 0.9, &[("g.rs", "y")]);
        let first = merge(&[a.clone(), b.clone()]);
        let second = merge(&[b, a]);
        assert_eq!(live_repo_names(&first), live_repo_names(&second));
    }
}
