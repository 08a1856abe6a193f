//! Partial signature creation and verification (§4.5.4, §4.5.5).

use lotus_primitives::{tagged_hash_scalar, Point, Scalar};
use lotus_schnorr::challenge;

use crate::error::MusigError;
use crate::key_agg::KeyAggContext;
use crate::nonce::{AggregatedNonce, PublicNonce, SecretNonce};

/// `b = taggedHash("MuSig/noncecoef", compressed(R1) || compressed(R2) ||
/// compressed(Q) || message)`.
pub(crate) fn nonce_coefficient(
    agg_nonce: &AggregatedNonce,
    agg_pubkey: &Point,
    message: &[u8; 32],
) -> Scalar {
    let mut buf = Vec::with_capacity(33 * 3 + 32);
    buf.extend_from_slice(&agg_nonce.r1.to_compressed());
    buf.extend_from_slice(&agg_nonce.r2.to_compressed());
    buf.extend_from_slice(&agg_pubkey.to_compressed());
    buf.extend_from_slice(message);
    tagged_hash_scalar("MuSig/noncecoef", &buf)
}

/// Effective nonce `R = R1 + b*R2`. Negation for quadratic-residue
/// correction never changes `R.x` (point negation flips only Y), so this
/// same value is used for the challenge regardless of which sign ends up
/// applied to the secret/public nonce components.
pub(crate) fn effective_nonce(agg_nonce: &AggregatedNonce, b: &Scalar) -> Point {
    agg_nonce.r1.add(&agg_nonce.r2.mul(b))
}

/// `musigPartialSign(secretNonce, sk, keyAgg, signerIndex, aggNonce,
/// message)`. Consumes `secretNonce` by value: it is bound to exactly
/// this call and is zeroized on drop regardless of how this function
/// returns.
pub fn musig_partial_sign(
    secret_nonce: SecretNonce,
    sk: &Scalar,
    key_agg: &KeyAggContext,
    signer_index: usize,
    agg_nonce: &AggregatedNonce,
    message: &[u8; 32],
) -> Result<Scalar, MusigError> {
    let coefficient = key_agg.coefficient_for(signer_index)?.clone();
    let b = nonce_coefficient(agg_nonce, &key_agg.aggregated_pubkey, message);
    let r = effective_nonce(agg_nonce, &b);

    let (k1, k2) = if r.y_is_quadratic_residue() {
        (secret_nonce.k1.clone(), secret_nonce.k2.clone())
    } else {
        (secret_nonce.k1.negate(), secret_nonce.k2.negate())
    };

    let e = challenge(&r.x_bytes(), &key_agg.aggregated_pubkey, message);
    let s = k1.add(&b.mul(&k2)).add(&e.mul(&coefficient).mul(sk));
    Ok(s)
}

/// `musigPartialSigVerify(sᵢ, Rᵢ, Pᵢ, keyAgg, signerIndex, aggNonce,
/// message)`: recompute `b`, `R`, `e`, then check
/// `sᵢ·G == ±(R1ᵢ + b·R2ᵢ) + e·aᵢ·Pᵢ`, flipping the sign on the
/// signer's own nonce contribution exactly when the aggregate `R` is not
/// a quadratic residue.
pub fn musig_partial_sig_verify(
    partial_sig: &Scalar,
    public_nonce: &PublicNonce,
    pubkey: &Point,
    key_agg: &KeyAggContext,
    signer_index: usize,
    agg_nonce: &AggregatedNonce,
    message: &[u8; 32],
) -> Result<bool, MusigError> {
    let coefficient = key_agg.coefficient_for(signer_index)?.clone();
    let b = nonce_coefficient(agg_nonce, &key_agg.aggregated_pubkey, message);
    let r = effective_nonce(agg_nonce, &b);

    let own_contribution = public_nonce.r1.add(&public_nonce.r2.mul(&b));
    let own_contribution = if r.y_is_quadratic_residue() {
        own_contribution
    } else {
        own_contribution.negate()
    };

    let e = challenge(&r.x_bytes(), &key_agg.aggregated_pubkey, message);
    let rhs = own_contribution.add(&pubkey.mul(&e.mul(&coefficient)));
    let lhs = Point::from_scalar_mul_generator(partial_sig);
    Ok(lhs == rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce::{musig_nonce_agg, musig_nonce_gen};

    #[test]
    fn partial_signature_verifies_against_own_share() {
        let sk = Scalar::from_bytes_nonzero(&[0x07; 32]).unwrap();
        let pubkey = Point::from_scalar_mul_generator(&sk);
        let key_agg = KeyAggContext::new(vec![pubkey.clone()]).unwrap();
        let message = [0x11u8; 32];
        let mut rng = rand::rngs::OsRng;

        let (secret_nonce, public_nonce) =
            musig_nonce_gen(&sk, &key_agg.aggregated_pubkey, &message, None, &mut rng);
        let agg_nonce = musig_nonce_agg(&[public_nonce.clone()]).unwrap();

        let partial = musig_partial_sign(secret_nonce, &sk, &key_agg, 0, &agg_nonce, &message)
            .unwrap();
        let ok = musig_partial_sig_verify(
            &partial,
            &public_nonce,
            &pubkey,
            &key_agg,
            0,
            &agg_nonce,
            &message,
        )
        .unwrap();
        assert!(ok);
    }

    #[test]
    fn partial_signature_rejects_wrong_signer_index() {
        let sk_a = Scalar::from_bytes_nonzero(&[0x08; 32]).unwrap();
        let sk_b = Scalar::from_bytes_nonzero(&[0x09; 32]).unwrap();
        let pk_a = Point::from_scalar_mul_generator(&sk_a);
        let pk_b = Point::from_scalar_mul_generator(&sk_b);
        let key_agg = KeyAggContext::new(vec![pk_a.clone(), pk_b.clone()]).unwrap();
        let message = [0x22u8; 32];
        let mut rng = rand::rngs::OsRng;

        let (secret_a, public_a) =
            musig_nonce_gen(&sk_a, &key_agg.aggregated_pubkey, &message, None, &mut rng);
        let (_secret_b, public_b) =
            musig_nonce_gen(&sk_b, &key_agg.aggregated_pubkey, &message, None, &mut rng);
        let agg_nonce = musig_nonce_agg(&[public_a.clone(), public_b]).unwrap();

        let partial = musig_partial_sign(secret_a, &sk_a, &key_agg, 0, &agg_nonce, &message)
            .unwrap();
        let ok = musig_partial_sig_verify(
            &partial, &public_a, &pk_a, &key_agg, 1, &agg_nonce, &message,
        )
        .unwrap();
        assert!(!ok);
    }
}
