//! Scalar arithmetic modulo the secp256k1 group order `n` (§3, §4.1).

use k256::elliptic_curve::ff::{Field, PrimeField};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::subtle::ConstantTimeEq;
use k256::{FieldBytes, U256};
use zeroize::Zeroize;

use crate::error::PrimitivesError;

/// A scalar modulo the secp256k1 group order `n`.
///
/// Backed by `k256::Scalar`, which already reduces all arithmetic modulo
/// `n` in constant time.
///
/// Not `Copy`: it zeroizes on drop, and a type with a destructor cannot
/// implement `Copy`. Clone explicitly where a second copy is needed.
#[derive(Clone)]
pub struct Scalar(pub(crate) k256::Scalar);

impl Scalar {
    pub fn zero() -> Self {
        Scalar(k256::Scalar::ZERO)
    }

    pub fn one() -> Self {
        Scalar(k256::Scalar::ONE)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero().into()
    }

    /// Parse a scalar from 32 big-endian bytes, rejecting values `>= n`.
    pub fn from_bytes_checked(bytes: &[u8; 32]) -> Result<Self, PrimitivesError> {
        let repr = FieldBytes::clone_from_slice(bytes);
        let candidate = k256::Scalar::from_repr(repr);
        if candidate.is_some().into() {
            Ok(Scalar(candidate.unwrap()))
        } else {
            Err(PrimitivesError::InvalidEncoding(
                "scalar value is not less than the group order".into(),
            ))
        }
    }

    /// Parse a scalar from 32 big-endian bytes, rejecting `>= n` and zero.
    pub fn from_bytes_nonzero(bytes: &[u8; 32]) -> Result<Self, PrimitivesError> {
        let scalar = Self::from_bytes_checked(bytes)?;
        if scalar.is_zero() {
            return Err(PrimitivesError::ZeroScalar);
        }
        Ok(scalar)
    }

    /// Reduce an arbitrary 32-byte value modulo `n`.
    ///
    /// Used wherever an arbitrary hash output must be interpreted as a scalar modulo `n`
    /// (tagged-hash outputs, challenge hashes) — unlike
    /// [`Self::from_bytes_checked`], this never fails: values `>= n` wrap
    /// around rather than being rejected.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let uint = U256::from_be_slice(bytes);
        Scalar(k256::Scalar::reduce(uint))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let repr = self.0.to_repr();
        let mut out = [0u8; 32];
        out.copy_from_slice(repr.as_slice());
        out
    }

    /// Sample a uniformly random non-zero scalar from a CSPRNG.
    pub fn random(rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng)) -> Self {
        loop {
            let candidate = k256::Scalar::random(&mut *rng);
            if !bool::from(candidate.is_zero()) {
                return Scalar(candidate);
            }
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Scalar(self.0 + other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Scalar(self.0 - other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Scalar(self.0 * other.0)
    }

    pub fn negate(&self) -> Self {
        Scalar(self.0.negate())
    }

    /// Modular inverse. Returns `None` for the zero scalar.
    pub fn invert(&self) -> Option<Self> {
        let inv = self.0.invert();
        if inv.is_some().into() {
            Some(Scalar(inv.unwrap()))
        } else {
            None
        }
    }

    pub(crate) fn inner(&self) -> &k256::Scalar {
        &self.0
    }

    pub(crate) fn from_inner(inner: k256::Scalar) -> Self {
        Scalar(inner)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}
impl Eq for Scalar {}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 = k256::Scalar::ZERO;
    }
}

impl Drop for Scalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scalar(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_zero() {
        assert!(Scalar::zero().is_zero());
        assert!(!Scalar::one().is_zero());
    }

    #[test]
    fn reduced_roundtrip_below_order() {
        let bytes = [0u8; 31]
            .iter()
            .chain([7u8].iter())
            .copied()
            .collect::<Vec<u8>>();
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        let a = Scalar::from_bytes_checked(&arr).unwrap();
        let b = Scalar::from_bytes_reduced(&arr);
        assert_eq!(a, b);
    }

    #[test]
    fn add_sub_roundtrip() {
        let mut rng = rand::rngs::OsRng;
        let a = Scalar::random(&mut rng);
        let b = Scalar::random(&mut rng);
        let sum = a.add(&b);
        let back = sum.sub(&b);
        assert_eq!(a, back);
    }

    #[test]
    fn invert_zero_is_none() {
        assert!(Scalar::zero().invert().is_none());
    }

    #[test]
    fn invert_roundtrip() {
        let mut rng = rand::rngs::OsRng;
        let a = Scalar::random(&mut rng);
        let inv = a.invert().unwrap();
        assert_eq!(a.mul(&inv), Scalar::one());
    }

    #[test]
    fn max_value_rejected() {
        let max = [0xffu8; 32];
        assert!(Scalar::from_bytes_checked(&max).is_err());
    }
}
