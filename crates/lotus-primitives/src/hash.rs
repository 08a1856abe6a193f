//! SHA256, SHA256d, and BIP340-style tagged hashing (§3, §4.1).

use bitcoin::hashes::{sha256, Hash, HashEngine};

use crate::scalar::Scalar;

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha256::Hash::hash(data).to_byte_array()
}

/// Double SHA-256: `SHA256(SHA256(data))`.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// `SHA256(SHA256(tag) || SHA256(tag) || data)`, as used throughout
/// Taproot and MuSig2 for domain separation (§3).
pub fn tagged_hash(tag: &str, data: &[u8]) -> [u8; 32] {
    let tag_hash = sha256(tag.as_bytes());
    let mut engine = sha256::Hash::engine();
    engine.input(&tag_hash);
    engine.input(&tag_hash);
    engine.input(data);
    sha256::Hash::from_engine(engine).to_byte_array()
}

/// `tagged_hash(tag, data)` interpreted as a scalar modulo `n`.
pub fn tagged_hash_scalar(tag: &str, data: &[u8]) -> Scalar {
    Scalar::from_bytes_reduced(&tagged_hash(tag, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256d_is_sha256_twice() {
        let data = b"lotus";
        assert_eq!(sha256d(data), sha256(&sha256(data)));
    }

    #[test]
    fn tagged_hash_is_deterministic() {
        let a = tagged_hash("TapTweak", b"hello");
        let b = tagged_hash("TapTweak", b"hello");
        assert_eq!(a, b);
    }

    #[test]
    fn tagged_hash_is_tag_separated() {
        let a = tagged_hash("TapTweak", b"hello");
        let b = tagged_hash("TapLeaf", b"hello");
        assert_ne!(a, b);
    }

    #[test]
    fn known_bip340_tagtweak_vector() {
        // BIP340/341 TapTweak tag hash of an empty payload is a well-known
        // constant repeated twice; sanity-check our tagged_hash matches the
        // generic construction rather than re-deriving the exact vector.
        let direct = {
            let tag_hash = sha256(b"TapTweak");
            let mut buf = Vec::new();
            buf.extend_from_slice(&tag_hash);
            buf.extend_from_slice(&tag_hash);
            sha256(&buf)
        };
        assert_eq!(tagged_hash("TapTweak", b""), direct);
    }
}
