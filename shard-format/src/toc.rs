//! Shard file footer and table of contents (spec.md §6 "External interfaces").
//!
//! Layout on disk:
//! ```text
//! [section bytes...][section bytes...]...[toc bytes][Footer]
//! ```
//! Sections are written first, each as postcard-encoded bytes, in whatever
//! order the builder produces them. The TOC (name, offset, length for each
//! section) follows, postcard-encoded. A fixed-size [`Footer`] is always the
//! last [`FOOTER_SIZE`] bytes so a reader can `seek` to the end, learn the
//! TOC's location, and only then map/parse the rest — this is what lets the
//! shard be opened via `mmap` and read section-by-section instead of
//! decoding the whole file up front (unlike the teacher's `persistent.rs`,
//! which zstd-compresses the entire file as one stream; a compressed stream
//! cannot be seeked into, which spec.md's "memory-mapped search core"
//! requirement rules out for this format — see DESIGN.md).

use crate::error::{Result, ShardError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAGIC: [u8; 4] = *b"ZSH1";
/// `u32` version + `u64` toc offset + 4 magic bytes.
pub const FOOTER_SIZE: usize = 4 + 8 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub version: u32,
    pub toc_offset: u64,
}

impl Footer {
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.toc_offset.to_le_bytes());
        out.extend_from_slice(&MAGIC);
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FOOTER_SIZE {
            return Err(ShardError::Corruption {
                reason: "file shorter than footer".into(),
                section: None,
            });
        }
        let tail = &bytes[bytes.len() - FOOTER_SIZE..];
        let magic = &tail[12..16];
        if magic != MAGIC {
            return Err(ShardError::Corruption {
                reason: "bad magic bytes".into(),
                section: None,
            });
        }
        let version = u32::from_le_bytes(tail[0..4].try_into().unwrap());
        if version != crate::naming::FORMAT_VERSION_V16 && version != crate::naming::FORMAT_VERSION_V17
        {
            return Err(ShardError::Corruption {
                reason: format!("unsupported shard version {version}"),
                section: None,
            });
        }
        let toc_offset = u64::from_le_bytes(tail[4..12].try_into().unwrap());
        Ok(Footer { version, toc_offset })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocEntry {
    pub offset: u64,
    pub length: u64,
}

/// Named sections, addressed by name so the reader doesn't need to know a
/// fixed ordering (spec.md §6: "TOC: named sections `{name, offset,
/// length}`").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toc {
    pub sections: BTreeMap<String, TocEntry>,
}

impl Toc {
    pub fn get<'a>(&self, bytes: &'a [u8], name: &str) -> Result<&'a [u8]> {
        let entry = self.sections.get(name).ok_or_else(|| ShardError::Corruption {
            reason: format!("missing section {name}"),
            section: Some(name.to_string()),
        })?;
        let start = entry.offset as usize;
        let end = start + entry.length as usize;
        bytes.get(start..end).ok_or_else(|| ShardError::Corruption {
            reason: "section range out of bounds".into(),
            section: Some(name.to_string()),
        })
    }
}

/// Accumulates sections while the builder serializes a shard, then emits
/// the final byte buffer (sections + toc + footer).
pub struct TocWriter {
    buffer: Vec<u8>,
    toc: Toc,
}

impl TocWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            toc: Toc::default(),
        }
    }

    pub fn write_section(&mut self, name: &str, bytes: &[u8]) {
        let offset = self.buffer.len() as u64;
        self.buffer.extend_from_slice(bytes);
        self.toc.sections.insert(
            name.to_string(),
            TocEntry {
                offset,
                length: bytes.len() as u64,
            },
        );
    }

    pub fn write_section_postcard<T: Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        let bytes = postcard::to_allocvec(value).map_err(|e| ShardError::InternalInvariant(e.to_string()))?;
        self.write_section(name, &bytes);
        Ok(())
    }

    pub fn finish(mut self, version: u32) -> Vec<u8> {
        let toc_offset = self.buffer.len() as u64;
        let toc_bytes = postcard::to_allocvec(&self.toc).expect("toc always serializes");
        self.buffer.extend_from_slice(&toc_bytes);
        Footer { version, toc_offset }.write(&mut self.buffer);
        self.buffer
    }
}

impl Default for TocWriter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn read_toc(bytes: &[u8]) -> Result<(Footer, Toc)> {
    let footer = Footer::parse(bytes)?;
    let toc_bytes = bytes
        .get(footer.toc_offset as usize..bytes.len() - FOOTER_SIZE)
        .ok_or_else(|| ShardError::Corruption {
            reason: "toc range out of bounds".into(),
            section: None,
        })?;
    let toc: Toc = postcard::from_bytes(toc_bytes).map_err(|e| ShardError::Corruption {
        reason: format!("bad toc: {e}"),
        section: None,
    })?;
    Ok((footer, toc))
}
