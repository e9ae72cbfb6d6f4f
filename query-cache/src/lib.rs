//! Generic bounded LRU and the per-shard `docMatchTree` cache (spec.md §4.8).

mod docmatchtree;
mod lru;

pub use docmatchtree::{DocBitset, DocMatchTreeCache, DocMatchTreeKey, ENV_CAPACITY};
pub use lru::LruCache;
