//! Taproot key tweaking (§4.3).

use lotus_primitives::{tagged_hash_scalar, Point, Scalar};

/// All-zero merkle root, meaning "key-path-only" (§3).
pub const ZERO_MERKLE_ROOT: [u8; 32] = [0u8; 32];

/// `t = taggedHash("TapTweak", compressed(P_internal) || merkle_root)`.
pub fn compute_tweak(internal_key: &Point, merkle_root: &[u8; 32]) -> Scalar {
    let mut buf = Vec::with_capacity(33 + 32);
    buf.extend_from_slice(&internal_key.to_compressed());
    buf.extend_from_slice(merkle_root);
    tagged_hash_scalar("TapTweak", &buf)
}

/// `P_out = P_internal + t*G`.
pub fn tweaked_pubkey(internal_key: &Point, merkle_root: &[u8; 32]) -> (Point, Scalar) {
    let t = compute_tweak(internal_key, merkle_root);
    let t_g = Point::from_scalar_mul_generator(&t);
    (internal_key.add(&t_g), t)
}

/// `x_out = (x_internal + t) mod n`, for a private-key holder spending via
/// the key path.
pub fn tweaked_privkey(internal_privkey: &Scalar, tweak: &Scalar) -> Scalar {
    internal_privkey.add(tweak)
}
