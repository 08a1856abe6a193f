//! MuSig2 key aggregation, `musigKeyAgg` (§4.5.1), plus Taproot tweak
//! integration (§4.5.7).

use lotus_primitives::{tagged_hash, tagged_hash_scalar, Point, Scalar};

use crate::error::MusigError;

/// The result of aggregating an ordered list of signer public keys.
///
/// Key order is significant and part of the context: two contexts built
/// from the same keys in a different order aggregate to a different `Q`.
#[derive(Clone, Debug)]
pub struct KeyAggContext {
    pubkeys: Vec<Point>,
    coefficients: Vec<Scalar>,
    /// `Q`, or the Taproot-tweaked `Q + t*G` once [`Self::with_taproot_tweak`]
    /// has been applied.
    pub aggregated_pubkey: Point,
    /// Set once a Taproot tweak has been folded into `aggregated_pubkey`;
    /// `musig_sig_agg` adds `e * tweak` as a known offset at the final
    /// aggregation step rather than asking any individual signer to sign
    /// for it (§4.5.7, "tweak Q first").
    pub tweak: Option<Scalar>,
}

impl KeyAggContext {
    /// `musigKeyAgg(pubkeys)`: reject the empty list, derive per-signer
    /// coefficients from a list hash, and sum `Q = Σ aᵢ·Pᵢ`.
    pub fn new(pubkeys: Vec<Point>) -> Result<Self, MusigError> {
        if pubkeys.is_empty() {
            return Err(MusigError::EmptyPublicKeyList);
        }

        let mut list_buf = Vec::with_capacity(pubkeys.len() * 33);
        for pubkey in &pubkeys {
            list_buf.extend_from_slice(&pubkey.to_compressed());
        }
        let list_hash = tagged_hash("KeyAgg list", &list_buf);

        let mut coefficients = Vec::with_capacity(pubkeys.len());
        let mut aggregated: Option<Point> = None;
        for pubkey in &pubkeys {
            let mut coef_buf = Vec::with_capacity(32 + 33);
            coef_buf.extend_from_slice(&list_hash);
            coef_buf.extend_from_slice(&pubkey.to_compressed());
            let coefficient = tagged_hash_scalar("KeyAgg coefficient", &coef_buf);

            let contribution = pubkey.mul(&coefficient);
            aggregated = Some(match aggregated {
                Some(acc) => acc.add(&contribution),
                None => contribution,
            });
            coefficients.push(coefficient);
        }

        Ok(KeyAggContext {
            pubkeys,
            coefficients,
            aggregated_pubkey: aggregated.expect("non-empty pubkeys guarantees one contribution"),
            tweak: None,
        })
    }

    pub fn pubkeys(&self) -> &[Point] {
        &self.pubkeys
    }

    pub fn coefficient_for(&self, signer_index: usize) -> Result<&Scalar, MusigError> {
        self.coefficients
            .get(signer_index)
            .ok_or(MusigError::SignerIndexOutOfRange(signer_index))
    }

    pub fn pubkey_for(&self, signer_index: usize) -> Result<&Point, MusigError> {
        self.pubkeys
            .get(signer_index)
            .ok_or(MusigError::SignerIndexOutOfRange(signer_index))
    }

    /// Fold a Taproot tweak into the aggregated key (§4.5.7): `Q` becomes
    /// `Q + t*G`, and `t` is recorded so signature aggregation can add
    /// `e*t` as a known offset rather than distributing it to a signer.
    pub fn with_taproot_tweak(mut self, merkle_root: &[u8; 32]) -> Self {
        let t = lotus_taproot::compute_tweak(&self.aggregated_pubkey, merkle_root);
        let t_g = Point::from_scalar_mul_generator(&t);
        self.aggregated_pubkey = self.aggregated_pubkey.add(&t_g);
        self.tweak = Some(t);
        self
    }
}
