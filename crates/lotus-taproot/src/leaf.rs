//! Tapscript leaves (§3).

use lotus_primitives::{tagged_hash, varint};

/// Default leaf version, matching every other Taproot-style system.
pub const DEFAULT_LEAF_VERSION: u8 = 0xC0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapLeaf {
    pub leaf_version: u8,
    pub script: Vec<u8>,
}

impl TapLeaf {
    pub fn new(script: Vec<u8>) -> Self {
        TapLeaf {
            leaf_version: DEFAULT_LEAF_VERSION,
            script,
        }
    }

    pub fn with_version(leaf_version: u8, script: Vec<u8>) -> Self {
        TapLeaf {
            leaf_version,
            script,
        }
    }

    /// `taggedHash("TapLeaf", leaf_version || varint(len(script)) || script)`.
    pub fn leaf_hash(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(1 + 5 + self.script.len());
        buf.push(self.leaf_version);
        buf.extend_from_slice(&varint::encode_with_len_prefix(&self.script));
        tagged_hash("TapLeaf", &buf)
    }
}
