use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Cancelled(#[from] search_cancel::CancelReason),
    #[error("bad regex pattern: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;
