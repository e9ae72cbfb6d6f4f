//! Compound-shard disassembly (spec.md §4.7 "Explode"): "Stream documents
//! grouped by contiguous repo id; for each new repo, finalize the previous
//! builder and start a new one." Tombstoned repos contribute no output
//! shard, matching merge's drop of tombstoned repos.

use crate::replay::reconstruct_document;
use shard_format::ShardContent;

/// Splits a compound shard into one simple shard per live repo, in the
/// order repo ids appear in `shard` (spec.md §3 invariant: repo ids are
/// non-decreasing, so a single forward pass suffices).
pub fn explode(shard: &ShardContent) -> Vec<ShardContent> {
    let mut out = Vec::new();
    let mut current: Option<ShardContent> = None;
    let mut current_repo_id = None;

    for doc in 0..shard.doc_count() as u32 {
        let repo_id = shard.repo_index[doc as usize];
        let repo = shard
            .repository(repo_id)
            .expect("doc references a repo present in the shard");
        if repo.tombstone {
            continue;
        }
        if current_repo_id != Some(repo_id) {
            if let Some(done) = current.take() {
                out.push(done);
            }
            let mut fresh = ShardContent::default();
            let mut new_repo = repo.clone();
            new_repo.id = 0;
            fresh.repositories.push(new_repo);
            current = Some(fresh);
            current_repo_id = Some(repo_id);
        }

        let sc = current.as_mut().unwrap();
        if shard.skipped[doc as usize] {
            sc.push_skipped(0, &shard.doc_names[doc as usize]);
        } else {
            let document = reconstruct_document(shard, repo, doc);
            let mask = sc.repositories[0].encode_branch_mask(&document.branches);
            sc.push_document(0, mask, &document);
        }
    }
    if let Some(done) = current.take() {
        out.push(done);
    }
    out
}
