use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Match(#[from] match_engine::MatchError),
    #[error("no scheduler permit became available before the deadline")]
    NoPermit,
    #[error("shard {0} panicked during search")]
    Crash(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
