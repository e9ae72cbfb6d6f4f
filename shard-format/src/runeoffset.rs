//! Rune-offset to byte-offset resolution (spec.md §4.4, §9: "lazy candidate
//! resolution... using a per-document rune→byte table").
//!
//! Trigram postings are keyed by rune offset so Unicode content indexes and
//! searches correctly regardless of encoding width, but content is stored
//! (and highlighted) as bytes. A [`RuneOffsetTable`] is built once per
//! document at index time and consulted only when a candidate survives
//! enough pruning to need byte-accurate verification.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuneOffsetTable {
    /// `byte_offsets[r]` is the byte offset of rune `r`'s first byte.
    /// Has `rune_count + 1` entries; the last entry is the content length,
    /// mirroring `boundaries[numDocs]` being the total content length.
    byte_offsets: Vec<u32>,
}

impl RuneOffsetTable {
    pub fn build(content: &[u8]) -> Self {
        let text = String::from_utf8_lossy(content);
        let mut byte_offsets = Vec::with_capacity(text.len() + 1);
        for (byte_idx, _) in text.char_indices() {
            byte_offsets.push(byte_idx as u32);
        }
        byte_offsets.push(content.len() as u32);
        Self { byte_offsets }
    }

    pub fn rune_count(&self) -> usize {
        self.byte_offsets.len().saturating_sub(1)
    }

    /// Resolves a rune offset to a byte offset. Panics on out-of-range
    /// input, matching the invariant that candidates are only resolved
    /// after being confirmed to originate from this document's postings.
    pub fn byte_offset(&self, rune_offset: u32) -> u32 {
        self.byte_offsets[rune_offset as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_offsets_are_identity() {
        let table = RuneOffsetTable::build(b"hello");
        assert_eq!(table.rune_count(), 5);
        for i in 0..5 {
            assert_eq!(table.byte_offset(i as u32), i as u32);
        }
        assert_eq!(table.byte_offset(5), 5);
    }

    #[test]
    fn multibyte_offsets_skip_continuation_bytes() {
        let text = "a\u{4e16}b"; // 'a', U+4E16 (3 bytes in UTF-8), 'b'
        let table = RuneOffsetTable::build(text.as_bytes());
        assert_eq!(table.rune_count(), 3);
        assert_eq!(table.byte_offset(0), 0);
        assert_eq!(table.byte_offset(1), 1);
        assert_eq!(table.byte_offset(2), 4);
        assert_eq!(table.byte_offset(3), 5);
    }
}
