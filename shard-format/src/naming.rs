//! Shard file naming (spec.md §3 invariants, §4.7, §6).

use crate::repository::Repository;
use sha1::{Digest as Sha1Digest, Sha1};
use sha2::{Digest as Sha256Digest, Sha256};

pub const FORMAT_VERSION_V16: u32 = 16;
pub const FORMAT_VERSION_V17: u32 = 17;

/// `WORKSPACES_API_URL` (spec.md §6): non-empty flips shard naming to
/// id-prefixed, so multi-tenant deployments don't leak repo names into
/// shard file names on disk.
pub const ENV_WORKSPACES_API_URL: &str = "WORKSPACES_API_URL";

/// True if [`ENV_WORKSPACES_API_URL`] is set to anything non-empty.
pub fn tenant_enforced() -> bool {
    std::env::var(ENV_WORKSPACES_API_URL)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

/// Picks [`simple_shard_name`]'s prefix: the repository's numeric id when
/// [`tenant_enforced`], else its name (spec.md §6).
pub fn simple_shard_name_for_repo(repo: &Repository, version: u32, shard_index: u32) -> String {
    let prefix = if tenant_enforced() {
        repo.id.to_string()
    } else {
        repo.name.clone()
    };
    simple_shard_name(&prefix, version, shard_index)
}

/// `<prefix>_v<version>.<n>.zoekt`, `<prefix>` URL-escaped and truncated at
/// 200 bytes with an 8-hex-char sha256 suffix when longer (spec.md §3).
pub fn simple_shard_name(prefix: &str, version: u32, shard_index: u32) -> String {
    let escaped = url_escape_slashes(prefix);
    let prefix = if escaped.len() > 200 {
        let mut hasher = Sha256::new();
        hasher.update(escaped.as_bytes());
        let digest = hasher.finalize();
        let suffix: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
        format!("{}_{}", &escaped[..200], suffix)
    } else {
        escaped
    };
    format!("{prefix}_v{version}.{shard_index:05}.zoekt")
}

/// `compound-<sha1 of NUL-joined live repo names>_v<version>.<n>.zoekt`
/// (spec.md §3, §4.7; deterministic so re-merging the same repo set
/// produces the same file name, spec.md §8 invariant 9).
pub fn compound_shard_name(live_repo_names: &[String], version: u32, shard_index: u32) -> String {
    let mut hasher = Sha1::new();
    for (i, name) in live_repo_names.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(name.as_bytes());
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("compound-{hex}_v{version}.{shard_index:05}.zoekt")
}

fn url_escape_slashes(s: &str) -> String {
    s.replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // `ENV_WORKSPACES_API_URL` is process-global state; serialize the tests
    // that touch it so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn simple_name_is_stable() {
        assert_eq!(
            simple_shard_name("github.com/foo/bar", 16, 0),
            "github.com%2Ffoo%2Fbar_v16.00000.zoekt"
        );
    }

    #[test]
    fn compound_name_is_order_independent_in_content_but_order_sensitive_in_call() {
        let a = compound_shard_name(&["repoA".into(), "repoB".into()], 16, 0);
        let b = compound_shard_name(&["repoA".into(), "repoB".into()], 16, 0);
        assert_eq!(a, b);
        assert!(a.starts_with("compound-"));
    }

    #[test]
    fn long_prefix_is_truncated_with_hash_suffix() {
        let long = "x".repeat(250);
        let name = simple_shard_name(&long, 16, 3);
        // 200 chars of 'x' + '_' + 8 hex chars + "_v16.00003.zoekt"
        assert!(name.starts_with(&"x".repeat(200)));
        assert!(name.ends_with("_v16.00003.zoekt"));
        assert!(name.len() < long.len() + 20);
    }

    #[test]
    fn tenant_enforced_follows_env_var() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var(ENV_WORKSPACES_API_URL);
        assert!(!tenant_enforced());
        std::env::set_var(ENV_WORKSPACES_API_URL, "https://workspaces.example.com");
        assert!(tenant_enforced());
        std::env::remove_var(ENV_WORKSPACES_API_URL);
    }

    #[test]
    fn simple_shard_name_for_repo_switches_to_id_prefix_when_tenant_enforced() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var(ENV_WORKSPACES_API_URL);
        let repo = Repository::new(42, "github.com/foo/bar");
        assert_eq!(
            simple_shard_name_for_repo(&repo, 17, 0),
            simple_shard_name("github.com/foo/bar", 17, 0)
        );
        std::env::set_var(ENV_WORKSPACES_API_URL, "https://workspaces.example.com");
        assert_eq!(simple_shard_name_for_repo(&repo, 17, 0), simple_shard_name("42", 17, 0));
        std::env::remove_var(ENV_WORKSPACES_API_URL);
    }
}
