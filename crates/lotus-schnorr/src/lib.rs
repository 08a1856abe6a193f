//! Lotus-variant Schnorr signatures (component C2).
//!
//! Diverges from BIP340 in exactly one respect: the
//! challenge hash commits to the full 33-byte compressed public key, not
//! an x-only form, because Lotus public keys are always 33 bytes.

pub mod error;
mod rfc6979;

pub use error::SchnorrError;

use lotus_primitives::{sha256, Point, Scalar};

/// A Lotus Schnorr signature: `R.x (32 bytes, big-endian) || s (32 bytes)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
    pub r_x: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r_x);
        out[32..].copy_from_slice(&self.s);
        out
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut r_x = [0u8; 32];
        let mut s = [0u8; 32];
        r_x.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Signature { r_x, s }
    }

    /// Parse from a variable-length slice, as required when stripping a
    /// trailing sighash-type byte from a scriptSig (§6: 65 bytes total).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchnorrError> {
        if bytes.len() != 64 {
            return Err(SchnorrError::MalformedSignature(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(bytes);
        Ok(Self::from_bytes(&arr))
    }
}

/// Compute the Lotus Schnorr challenge `e = SHA256(R.x || compressed(P) || m) mod n`.
///
/// This is the single point where Lotus diverges from BIP340: `P` is the
/// full 33-byte compressed key, never the x-only form.
pub fn challenge(r_x: &[u8; 32], pubkey: &Point, message: &[u8; 32]) -> Scalar {
    let mut buf = Vec::with_capacity(32 + 33 + 32);
    buf.extend_from_slice(r_x);
    buf.extend_from_slice(&pubkey.to_compressed());
    buf.extend_from_slice(message);
    Scalar::from_bytes_reduced(&sha256(&buf))
}

/// Sign `message` (a 32-byte digest) with private key `x`, per §4.2.
pub fn sign(privkey: &Scalar, message: &[u8; 32]) -> Result<Signature, SchnorrError> {
    if privkey.is_zero() {
        return Err(SchnorrError::Primitive(
            lotus_primitives::PrimitivesError::ZeroScalar,
        ));
    }
    let pubkey = Point::from_scalar_mul_generator(privkey);

    let mut k = rfc6979::generate_k(privkey, message);
    let mut r_point = Point::from_scalar_mul_generator(&k);
    if !r_point.y_is_quadratic_residue() {
        k = k.negate();
        r_point = r_point.negate();
    }
    let r_x = r_point.x_bytes();

    let e = challenge(&r_x, &pubkey, message);
    let s = k.add(&e.mul(privkey));

    Ok(Signature {
        r_x,
        s: s.to_bytes(),
    })
}

/// Verify `signature` against `pubkey` for `message`, per §4.2.
pub fn verify(
    signature: &Signature,
    pubkey: &Point,
    message: &[u8; 32],
) -> Result<(), SchnorrError> {
    let s = Scalar::from_bytes_checked(&signature.s)
        .map_err(|_| SchnorrError::InvalidSignature)?;
    if s.is_zero() {
        return Err(SchnorrError::InvalidSignature);
    }
    // Reject R_x >= p is implied by requiring R_x to parse as a valid X
    // coordinate below (from_parity_and_x fails if no curve point exists).
    let e = challenge(&signature.r_x, pubkey, message);

    let s_g = Point::from_scalar_mul_generator(&s);
    let e_p = pubkey.mul(&e);
    let candidate_r = s_g.add(&e_p.negate());

    if candidate_r.is_identity() {
        return Err(SchnorrError::InvalidSignature);
    }
    if candidate_r.x_bytes() != signature.r_x {
        return Err(SchnorrError::InvalidSignature);
    }
    if !candidate_r.y_is_quadratic_residue() {
        return Err(SchnorrError::InvalidSignature);
    }
    Ok(())
}
