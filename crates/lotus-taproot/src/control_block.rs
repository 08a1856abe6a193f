//! Taproot control blocks (§3, §4.3).

use lotus_primitives::Point;

use crate::error::TaprootError;
use crate::leaf::DEFAULT_LEAF_VERSION;

const MAX_DEPTH: usize = 128;
/// `1` (leaf-version/parity byte) + `33` (internal key) + `32 * 128` (max path).
const MAX_CONTROL_BLOCK_LEN: usize = 1 + 33 + 32 * MAX_DEPTH;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlBlock {
    pub leaf_version: u8,
    pub internal_key: Point,
    pub merkle_path: Vec<[u8; 32]>,
}

impl ControlBlock {
    pub fn new(internal_key: Point, merkle_path: Vec<[u8; 32]>) -> Result<Self, TaprootError> {
        Self::with_leaf_version(DEFAULT_LEAF_VERSION, internal_key, merkle_path)
    }

    pub fn with_leaf_version(
        leaf_version: u8,
        internal_key: Point,
        merkle_path: Vec<[u8; 32]>,
    ) -> Result<Self, TaprootError> {
        if merkle_path.len() > MAX_DEPTH {
            return Err(TaprootError::TreeTooDeep);
        }
        Ok(ControlBlock {
            leaf_version,
            internal_key,
            merkle_path,
        })
    }

    /// `(leaf_version & 0xFE) | parity(internalKey)`.
    fn first_byte(&self) -> u8 {
        let parity = if self.internal_key.y_is_odd() { 1 } else { 0 };
        (self.leaf_version & 0xFE) | parity
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 33 + self.merkle_path.len() * 32);
        out.push(self.first_byte());
        out.extend_from_slice(&self.internal_key.to_compressed());
        for node in &self.merkle_path {
            out.extend_from_slice(node);
        }
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, TaprootError> {
        if bytes.len() < 34 {
            return Err(TaprootError::InvalidControlBlock(
                "too short for leaf byte + internal key".into(),
            ));
        }
        if bytes.len() > MAX_CONTROL_BLOCK_LEN {
            return Err(TaprootError::TreeTooDeep);
        }
        let remainder = bytes.len() - 34;
        if remainder % 32 != 0 {
            return Err(TaprootError::InvalidControlBlock(
                "path length is not a multiple of 32".into(),
            ));
        }

        let first = bytes[0];
        let leaf_version = first & 0xFE;
        let parity_bit = first & 0x01;

        let mut key_bytes = [0u8; 33];
        key_bytes.copy_from_slice(&bytes[1..34]);
        let internal_key =
            Point::from_compressed(&key_bytes).map_err(TaprootError::Primitive)?;

        let expected_parity = if internal_key.y_is_odd() { 1 } else { 0 };
        if parity_bit != expected_parity {
            return Err(TaprootError::InvalidControlBlock(
                "parity bit does not match internal key".into(),
            ));
        }

        let mut merkle_path = Vec::with_capacity(remainder / 32);
        let mut offset = 34;
        while offset < bytes.len() {
            let mut node = [0u8; 32];
            node.copy_from_slice(&bytes[offset..offset + 32]);
            merkle_path.push(node);
            offset += 32;
        }

        Self::with_leaf_version(leaf_version, internal_key, merkle_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotus_primitives::Scalar;

    fn internal_key() -> Point {
        Point::from_scalar_mul_generator(&Scalar::from_bytes_nonzero(&[0x01; 32]).unwrap())
    }

    #[test]
    fn serialize_parse_roundtrip() {
        let cb = ControlBlock::new(internal_key(), vec![[1u8; 32], [2u8; 32]]).unwrap();
        let bytes = cb.serialize();
        let parsed = ControlBlock::parse(&bytes).unwrap();
        assert_eq!(cb, parsed);
    }

    #[test]
    fn rejects_depth_above_128() {
        let path = vec![[0u8; 32]; 129];
        assert!(ControlBlock::new(internal_key(), path).is_err());
    }

    #[test]
    fn rejects_oversized_control_block_bytes() {
        let mut bytes = vec![0u8; 1 + 33 + 32 * 129];
        bytes[0] = DEFAULT_LEAF_VERSION;
        assert!(ControlBlock::parse(&bytes).is_err());
    }
}
