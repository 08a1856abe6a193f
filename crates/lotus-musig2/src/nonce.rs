//! MuSig2 nonce generation and aggregation (§4.5.2, §4.5.3).

use lotus_primitives::{tagged_hash_scalar, Point, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::MusigError;

/// A signer's two secret nonce scalars `(k1, k2)`. Bound to exactly one
/// call of [`crate::partial_sign::musig_partial_sign`], which consumes it
/// by value; never serialize this to disk or network.
pub struct SecretNonce {
    pub(crate) k1: Scalar,
    pub(crate) k2: Scalar,
}

impl Drop for SecretNonce {
    fn drop(&mut self) {
        self.k1.zeroize();
        self.k2.zeroize();
    }
}

/// The public half of a signer's nonce pair, `(R1, R2) = (k1*G, k2*G)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicNonce {
    pub r1: Point,
    pub r2: Point,
}

/// The sum of every participant's public nonce, `(ΣR1ᵢ, ΣR2ᵢ)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedNonce {
    pub r1: Point,
    pub r2: Point,
}

/// `musigNonceGen(sk, Q, message, extra?)`: sample `(k1, k2)` from a
/// CSPRNG, mixing in the private key, aggregated public key, message, and
/// optional extra input for domain separation. Never deterministic-only:
/// fresh randomness is drawn on every call, so repeated calls for the same
/// `(sk, Q, message)` yield independent nonces.
pub fn musig_nonce_gen(
    sk: &Scalar,
    agg_pubkey: &Point,
    message: &[u8; 32],
    extra: Option<&[u8]>,
    rng: &mut (impl RngCore + CryptoRng),
) -> (SecretNonce, PublicNonce) {
    let k1 = derive_nonce_scalar(sk, agg_pubkey, message, extra, 1, rng);
    let k2 = derive_nonce_scalar(sk, agg_pubkey, message, extra, 2, rng);
    let r1 = Point::from_scalar_mul_generator(&k1);
    let r2 = Point::from_scalar_mul_generator(&k2);
    (SecretNonce { k1, k2 }, PublicNonce { r1, r2 })
}

fn derive_nonce_scalar(
    sk: &Scalar,
    agg_pubkey: &Point,
    message: &[u8; 32],
    extra: Option<&[u8]>,
    which: u8,
    rng: &mut (impl RngCore + CryptoRng),
) -> Scalar {
    let mut fresh_randomness = [0u8; 32];
    rng.fill_bytes(&mut fresh_randomness);

    let mut buf = Vec::with_capacity(1 + 32 + 32 + 33 + 32);
    buf.push(which);
    buf.extend_from_slice(&fresh_randomness);
    buf.extend_from_slice(&sk.to_bytes());
    buf.extend_from_slice(&agg_pubkey.to_compressed());
    buf.extend_from_slice(message);
    if let Some(extra) = extra {
        buf.extend_from_slice(extra);
    }

    let scalar = tagged_hash_scalar("MuSig/nonce", &buf);
    fresh_randomness.zeroize();
    buf.zeroize();
    scalar
}

/// `musigNonceAgg(publicNonces[])`: reject empty, return `(ΣR1ᵢ, ΣR2ᵢ)`.
pub fn musig_nonce_agg(public_nonces: &[PublicNonce]) -> Result<AggregatedNonce, MusigError> {
    if public_nonces.is_empty() {
        return Err(MusigError::EmptyNonceList);
    }
    let mut r1 = public_nonces[0].r1.clone();
    let mut r2 = public_nonces[0].r2.clone();
    for nonce in &public_nonces[1..] {
        r1 = r1.add(&nonce.r1);
        r2 = r2.add(&nonce.r2);
    }
    Ok(AggregatedNonce { r1, r2 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_yield_independent_nonces() {
        let sk = Scalar::from_bytes_nonzero(&[0x01; 32]).unwrap();
        let q = Point::from_scalar_mul_generator(&sk);
        let msg = [0x02u8; 32];
        let mut rng = rand::rngs::OsRng;
        let (_secret_a, public_a) = musig_nonce_gen(&sk, &q, &msg, None, &mut rng);
        let (_secret_b, public_b) = musig_nonce_gen(&sk, &q, &msg, None, &mut rng);
        assert_ne!(public_a, public_b);
    }

    #[test]
    fn nonce_agg_rejects_empty() {
        assert!(musig_nonce_agg(&[]).is_err());
    }

    #[test]
    fn nonce_agg_sums_components() {
        let sk = Scalar::from_bytes_nonzero(&[0x03; 32]).unwrap();
        let q = Point::from_scalar_mul_generator(&sk);
        let msg = [0x04u8; 32];
        let mut rng = rand::rngs::OsRng;
        let (_s1, p1) = musig_nonce_gen(&sk, &q, &msg, None, &mut rng);
        let (_s2, p2) = musig_nonce_gen(&sk, &q, &msg, None, &mut rng);
        let agg = musig_nonce_agg(&[p1.clone(), p2.clone()]).unwrap();
        assert_eq!(agg.r1, p1.r1.add(&p2.r1));
        assert_eq!(agg.r2, p1.r2.add(&p2.r2));
    }
}
