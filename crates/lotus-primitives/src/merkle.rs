//! Generic binary merkle root over a list of 32-byte leaves (§3).
//!
//! This is the list-merkle used by the LOTUS sighash algorithm (§4.4.2),
//! not the Taproot script-tree construction in `lotus-taproot`, which
//! hashes explicit (possibly unbalanced) trees with lexicographic pairing
//! instead of positional pairing.

use crate::hash::sha256d;

/// Zero hash used to pad an odd-sized layer.
pub const ZERO_HASH: [u8; 32] = [0u8; 32];

/// Compute the merkle root and height over `leaves`.
///
/// - 0 leaves: zero hash, height 0.
/// - 1 leaf: the leaf itself, height 1.
/// - Otherwise: pair adjacent hashes (padding the last one with the zero
///   hash if the layer is odd), hashing each pair with `SHA256d(L || R)`,
///   until a single root remains. Height counts all layers including the
///   leaf layer.
pub fn merkle_root(leaves: &[[u8; 32]]) -> ([u8; 32], u8) {
    if leaves.is_empty() {
        return (ZERO_HASH, 0);
    }
    let mut layer: Vec<[u8; 32]> = leaves.to_vec();
    let mut height: u8 = 1;
    while layer.len() > 1 {
        let mut next = Vec::with_capacity((layer.len() + 1) / 2);
        for pair in layer.chunks(2) {
            let left = pair[0];
            let right = if pair.len() == 2 { pair[1] } else { ZERO_HASH };
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(&left);
            buf[32..].copy_from_slice(&right);
            next.push(sha256d(&buf));
        }
        layer = next;
        height += 1;
    }
    (layer[0], height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_leaves() {
        assert_eq!(merkle_root(&[]), (ZERO_HASH, 0));
    }

    #[test]
    fn one_leaf() {
        let leaf = [7u8; 32];
        assert_eq!(merkle_root(&[leaf]), (leaf, 1));
    }

    #[test]
    fn two_leaves_height_two() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let (root, height) = merkle_root(&[a, b]);
        assert_eq!(height, 2);
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&a);
        buf[32..].copy_from_slice(&b);
        assert_eq!(root, sha256d(&buf));
    }

    #[test]
    fn odd_count_pads_with_zero_hash() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let c = [3u8; 32];
        let (root, height) = merkle_root(&[a, b, c]);
        assert_eq!(height, 3);

        let mut ab = [0u8; 64];
        ab[..32].copy_from_slice(&a);
        ab[32..].copy_from_slice(&b);
        let ab_hash = sha256d(&ab);

        let mut c_pad = [0u8; 64];
        c_pad[..32].copy_from_slice(&c);
        c_pad[32..].copy_from_slice(&ZERO_HASH);
        let c_hash = sha256d(&c_pad);

        let mut top = [0u8; 64];
        top[..32].copy_from_slice(&ab_hash);
        top[32..].copy_from_slice(&c_hash);
        assert_eq!(root, sha256d(&top));
    }

    #[test]
    fn height_matches_log2_formula() {
        for n in 1usize..=16 {
            let leaves: Vec<[u8; 32]> = (0..n).map(|i| [i as u8; 32]).collect();
            let (_, height) = merkle_root(&leaves);
            let expected = (n as f64).log2().ceil() as u8 + 1;
            assert_eq!(height, expected, "n={n}");
        }
    }
}
