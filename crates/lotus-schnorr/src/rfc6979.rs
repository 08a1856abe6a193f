//! RFC 6979 deterministic nonce derivation (§4.2 step 1).
//!
//! secp256k1's group order has the same bit length as a SHA-256 digest, so
//! the generic RFC 6979 `bits2int`/`bits2octets` transforms collapse to
//! plain 32-byte big-endian encode/decode plus a modular reduction — no
//! bit-shifting is needed here the way it would be for curves whose order
//! isn't a round number of hash-output bytes.

use bitcoin::hashes::{sha256, Hash, HashEngine, Hmac, HmacEngine};

use lotus_primitives::Scalar;

/// Lotus's personalization string for Schnorr nonce derivation, including
/// its two trailing spaces.
pub const SCHNORR_PERSONALIZATION: &[u8] = b"Schnorr+SHA256  ";

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut engine = HmacEngine::<sha256::Hash>::new(key);
    for part in parts {
        engine.input(part);
    }
    Hmac::from_engine(engine).to_byte_array()
}

/// Deterministically derive the per-signature nonce scalar `k` from a
/// private key and a 32-byte message digest, per RFC 6979 with the Lotus
/// personalization string mixed in as additional data.
pub fn generate_k(privkey: &Scalar, message_digest: &[u8; 32]) -> Scalar {
    let x = privkey.to_bytes();
    // bits2octets(h1): since hlen == qlen for secp256k1+SHA256, this is just
    // h1 reduced modulo the group order.
    let h1 = Scalar::from_bytes_reduced(message_digest).to_bytes();

    let mut v = [0x01u8; 32];
    let mut k = [0x00u8; 32];

    k = hmac_sha256(&k, &[&v, &[0x00], &x, &h1, SCHNORR_PERSONALIZATION]);
    v = hmac_sha256(&k, &[&v]);
    k = hmac_sha256(&k, &[&v, &[0x01], &x, &h1, SCHNORR_PERSONALIZATION]);
    v = hmac_sha256(&k, &[&v]);

    loop {
        v = hmac_sha256(&k, &[&v]);
        if let Ok(candidate) = Scalar::from_bytes_nonzero(&v) {
            return candidate;
        }
        k = hmac_sha256(&k, &[&v, &[0x00]]);
        v = hmac_sha256(&k, &[&v]);
    }
}
