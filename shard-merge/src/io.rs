//! Atomic on-disk merge/explode (spec.md §4.7): write every output shard to
//! `dir` via [`shard_builder::write_shard_file`] (itself tmp-file + fsync +
//! rename) before touching the input, rolling back any already-written
//! output if a later one fails.

use crate::error::Result;
use crate::explode::explode;
use shard_format::ShardContent;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes a merged compound shard to `dir`, returning its final path.
pub fn write_merged(
    dir: &Path,
    merged: &ShardContent,
    version: u32,
    shard_index: u32,
) -> Result<PathBuf> {
    Ok(shard_builder::write_shard_file(
        dir,
        merged,
        version,
        shard_index,
    )?)
}

/// Splits the compound shard at `input_path` into one simple shard per live
/// repo, written into `dir`, then removes `input_path` — unless the sole
/// output would have landed at the same path, in which case the input is
/// left alone (spec.md §4.7: "If the sole output would have the same name
/// as the input ... the input is not deleted").
///
/// If a write fails partway through, every output already renamed into
/// place is removed before the error is returned, leaving `dir` as it was.
pub fn explode_to_dir(
    input_path: &Path,
    shard: &ShardContent,
    dir: &Path,
    version: u32,
) -> Result<Vec<PathBuf>> {
    let pieces = explode(shard);
    let mut written = Vec::new();
    for (i, piece) in pieces.iter().enumerate() {
        match shard_builder::write_shard_file(dir, piece, version, i as u32) {
            Ok(path) => written.push(path),
            Err(err) => {
                warn!(error = %err, "explode write failed, rolling back");
                for path in &written {
                    let _ = fs::remove_file(path);
                }
                return Err(err.into());
            }
        }
    }

    let keeps_input_path = written.len() == 1 && written[0] == input_path;
    if !keeps_input_path && input_path.exists() {
        fs::remove_file(input_path)?;
    }
    info!(outputs = written.len(), "exploded compound shard");
    Ok(written)
}
