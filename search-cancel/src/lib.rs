//! Cooperative cancellation for a single search.
//!
//! A search slot has one global, monotonically increasing "active version".
//! A [`CancellationToken`] captures the version in effect when the search
//! started; once any later search bumps the global past that version, every
//! still-running token for the earlier search observes itself as cancelled.
//! This gives "start a new interactive search, abandon the previous one"
//! semantics without a handle registry: the issuer only needs to remember
//! the version it was handed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Version of the most recently started search. Every [`CancellationToken`]
/// compares its own version against this value.
pub static ACTIVE_SEARCH_VERSION: AtomicU64 = AtomicU64::new(0);

/// A handle a long-running search polls to decide whether to keep going.
#[derive(Debug, Clone, Copy)]
pub struct CancellationToken {
    version: u64,
    deadline: Option<Instant>,
}

/// Why a [`CancellationToken::check`] call returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CancelReason {
    #[error("search was cancelled by a newer search")]
    Cancelled,
    #[error("search exceeded its wall-time deadline")]
    DeadlineExceeded,
}

impl CancellationToken {
    /// Registers `version` as the active search and returns a token for it.
    /// Any token issued with a smaller version becomes cancelled as soon as
    /// this call runs, because the global version only ever increases.
    pub fn new(version: u64) -> Self {
        ACTIVE_SEARCH_VERSION.fetch_max(version, Ordering::SeqCst);
        Self {
            version,
            deadline: None,
        }
    }

    /// Same as [`Self::new`], plus a wall-time budget for the search.
    pub fn with_deadline(version: u64, max_wall_time: Duration) -> Self {
        let mut token = Self::new(version);
        token.deadline = Some(Instant::now() + max_wall_time);
        token
    }

    /// True once a later search has registered itself.
    pub fn is_cancelled(&self) -> bool {
        ACTIVE_SEARCH_VERSION.load(Ordering::SeqCst) != self.version
    }

    /// True once the configured `max_wall_time` has elapsed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Convenience combining both checks; call this between shards and
    /// between documents in any loop long enough to matter.
    pub fn check(&self) -> Result<(), CancelReason> {
        if self.is_cancelled() {
            Err(CancelReason::Cancelled)
        } else if self.is_expired() {
            Err(CancelReason::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}
