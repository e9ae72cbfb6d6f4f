use thiserror::Error;

/// Error kinds shared by every shardsearch crate that sits at a public
/// boundary. Internal glue keeps using `anyhow::Error` the way the teacher's
/// `search-cache` crate does; this enum exists where a caller must be able
/// to tell "refuse to load a shard" apart from "cancelled" apart from
/// "bad query" (see spec.md's "Error handling design").
#[derive(Debug, Error)]
pub enum ShardError {
    #[error("shard corrupted: {reason} (at section {section:?})")]
    Corruption {
        reason: String,
        section: Option<String>,
    },

    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("search cancelled")]
    Cancelled,

    #[error("search exceeded its deadline")]
    DeadlineExceeded,

    #[error("panic during per-shard search: {message}")]
    Crash { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl From<search_cancel::CancelReason> for ShardError {
    fn from(reason: search_cancel::CancelReason) -> Self {
        match reason {
            search_cancel::CancelReason::Cancelled => ShardError::Cancelled,
            search_cancel::CancelReason::DeadlineExceeded => ShardError::DeadlineExceeded,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShardError>;
