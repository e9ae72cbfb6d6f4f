use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Shard(#[from] shard_format::ShardError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Build(#[from] shard_builder::BuildError),
}

pub type Result<T> = std::result::Result<T, MergeError>;
