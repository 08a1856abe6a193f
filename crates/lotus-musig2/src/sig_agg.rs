//! Final signature aggregation, `musigSigAgg` (§4.5.6).

use lotus_primitives::Scalar;
use lotus_schnorr::{challenge, Signature};

use crate::error::MusigError;
use crate::key_agg::KeyAggContext;
use crate::nonce::AggregatedNonce;
use crate::partial_sign::{effective_nonce, nonce_coefficient};

/// `musigSigAgg(partials[], aggNonce, message, Q)`: sum the partial
/// signatures, add the Taproot tweak contribution if one was folded into
/// `key_agg`, and return the resulting Lotus Schnorr signature. The
/// result is checked against `key_agg.aggregated_pubkey` before
/// returning, per the invariant that a finalized signature always
/// verifies (§3, invariant 4).
pub fn musig_sig_agg(
    partials: &[Scalar],
    agg_nonce: &AggregatedNonce,
    message: &[u8; 32],
    key_agg: &KeyAggContext,
) -> Result<Signature, MusigError> {
    if partials.is_empty() {
        return Err(MusigError::EmptyPartialSignatureList);
    }

    let b = nonce_coefficient(agg_nonce, &key_agg.aggregated_pubkey, message);
    let r = effective_nonce(agg_nonce, &b);
    let r_x = r.x_bytes();
    let e = challenge(&r_x, &key_agg.aggregated_pubkey, message);

    let mut s = partials[0].clone();
    for partial in &partials[1..] {
        s = s.add(partial);
    }
    if let Some(tweak) = &key_agg.tweak {
        s = s.add(&e.mul(tweak));
    }

    let signature = Signature {
        r_x,
        s: s.to_bytes(),
    };

    lotus_schnorr::verify(&signature, &key_agg.aggregated_pubkey, message)
        .map_err(|_| MusigError::AggregatedSignatureInvalid)?;

    Ok(signature)
}
