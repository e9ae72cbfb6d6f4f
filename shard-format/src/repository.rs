use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

bitflags! {
    /// Per-repository `raw-config` flags (spec.md §3, §6 "raw-config mask byte").
    #[derive(Default, Serialize, Deserialize)]
    pub struct RawConfig: u8 {
        const PUBLIC   = 0b0000_0001;
        const PRIVATE  = 0b0000_0010;
        const FORK     = 0b0000_0100;
        const ARCHIVED = 0b0000_1000;
    }
}

/// A named branch and the version string it was indexed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub version: String,
}

/// spec.md §3 `Repository`: stable numeric id, branch table (at most 64
/// branches so a document's membership fits a `u64` mask), free-form
/// metadata, tombstone flag, priority/rank, raw-config flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u32,
    pub name: String,
    pub branches: Vec<Branch>,
    pub metadata: BTreeMap<String, String>,
    pub tombstone: bool,
    pub priority: f64,
    pub rank: u16,
    pub raw_config: RawConfig,
}

/// Maximum branch count a single repository's document mask can encode
/// (spec.md §3: "at most 64 branches").
pub const MAX_BRANCHES: usize = 64;

impl Repository {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            branches: Vec::new(),
            metadata: BTreeMap::new(),
            tombstone: false,
            priority: 0.0,
            rank: 0,
            raw_config: RawConfig::empty(),
        }
    }

    /// Adds a branch, returning its bit index, or `None` if the repository
    /// already carries [`MAX_BRANCHES`] branches.
    pub fn add_branch(&mut self, name: impl Into<String>, version: impl Into<String>) -> Option<u32> {
        if self.branches.len() >= MAX_BRANCHES {
            return None;
        }
        let idx = self.branches.len() as u32;
        self.branches.push(Branch {
            name: name.into(),
            version: version.into(),
        });
        Some(idx)
    }

    pub fn branch_bit(&self, name: &str) -> Option<u32> {
        self.branches.iter().position(|b| b.name == name).map(|i| i as u32)
    }

    /// Union of every branch bit this repository defines.
    pub fn branch_bits(&self) -> u64 {
        if self.branches.is_empty() {
            0
        } else {
            (1u64 << self.branches.len()) - 1
        }
    }

    /// Encodes a set of branch names into this repository's mask
    /// (spec.md §4.1 item 3). Unknown branch names are ignored.
    pub fn encode_branch_mask(&self, names: &[String]) -> u64 {
        let mut mask = 0u64;
        for name in names {
            if let Some(bit) = self.branch_bit(name) {
                mask |= 1 << bit;
            }
        }
        mask
    }

    /// Inverse of [`Self::encode_branch_mask`], used by merge/explode to
    /// reconstruct branch names from a document's mask (spec.md §4.7).
    pub fn decode_branch_mask(&self, mask: u64) -> Vec<String> {
        self.branches
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, b)| b.name.clone())
            .collect()
    }
}
