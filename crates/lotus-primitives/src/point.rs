//! secp256k1 group element, serialized as a 33-byte compressed point (§3).

use k256::elliptic_curve::point::AffineCoordinates;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::Group;
use k256::{AffinePoint, EncodedPoint, ProjectivePoint};
use num_bigint::BigUint;

use crate::error::PrimitivesError;
use crate::scalar::Scalar;

/// secp256k1 field prime `p` (distinct from the group order `n`).
const FIELD_PRIME_HEX: &str =
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F";

/// A non-identity point on the secp256k1 curve.
///
/// Equality and hashing are structural on the compressed form, matching
/// Equality is structural on the compressed form (§3).
#[derive(Clone, Copy)]
pub struct Point(AffinePoint);

impl Point {
    pub fn generator() -> Self {
        Point(AffinePoint::GENERATOR)
    }

    /// secp256k1 scalar multiplication: `scalar * G`.
    pub fn from_scalar_mul_generator(scalar: &Scalar) -> Self {
        let projective = ProjectivePoint::GENERATOR * scalar.inner();
        Point(projective.to_affine())
    }

    pub fn is_identity(&self) -> bool {
        ProjectivePoint::from(self.0).is_identity().into()
    }

    pub fn add(&self, other: &Self) -> Self {
        let sum = ProjectivePoint::from(self.0) + ProjectivePoint::from(other.0);
        Point(sum.to_affine())
    }

    pub fn negate(&self) -> Self {
        let negated = -ProjectivePoint::from(self.0);
        Point(negated.to_affine())
    }

    pub fn mul(&self, scalar: &Scalar) -> Self {
        let product = ProjectivePoint::from(self.0) * scalar.inner();
        Point(product.to_affine())
    }

    /// `true` iff the compressed-form Y-parity bit would be `0x03`
    /// (odd Y), matching the "parity(internalKey)" rule used by control
    /// blocks (§3).
    pub fn y_is_odd(&self) -> bool {
        self.0.y_is_odd().into()
    }

    /// Quadratic-residue test on the affine Y coordinate, used by the
    /// Lotus Schnorr nonce/challenge rules (§4.2, §4.5.4) — distinct from
    /// [`Self::y_is_odd`], which only reports parity.
    pub fn y_is_quadratic_residue(&self) -> bool {
        let encoded = self.0.to_encoded_point(false);
        let y_bytes = encoded.y().expect("uncompressed encoding always has y");
        let p = field_prime();
        let y = BigUint::from_bytes_be(y_bytes.as_slice());
        if y == BigUint::from(0u8) {
            return false;
        }
        let exponent = (&p - BigUint::from(1u8)) / BigUint::from(2u8);
        y.modpow(&exponent, &p) == BigUint::from(1u8)
    }

    pub fn x_bytes(&self) -> [u8; 32] {
        let encoded = self.0.to_encoded_point(true);
        let mut out = [0u8; 32];
        out.copy_from_slice(&encoded.as_bytes()[1..33]);
        out
    }

    /// Serialize to the 33-byte compressed SEC1 form (§3, §6).
    pub fn to_compressed(&self) -> [u8; 33] {
        let encoded = self.0.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Parse a 33-byte compressed point, rejecting off-curve values,
    /// bad prefixes, and the point at infinity.
    pub fn from_compressed(bytes: &[u8; 33]) -> Result<Self, PrimitivesError> {
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(PrimitivesError::InvalidEncoding(format!(
                "invalid compressed-point prefix 0x{:02x}",
                bytes[0]
            )));
        }
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidEncoding(e.to_string()))?;
        let affine = AffinePoint::from_encoded_point(&encoded);
        if affine.is_none().into() {
            return Err(PrimitivesError::PointNotOnCurve);
        }
        let affine = affine.unwrap();
        if bool::from(ProjectivePoint::from(affine).is_identity()) {
            return Err(PrimitivesError::PointAtInfinity);
        }
        Ok(Point(affine))
    }

    /// Reconstruct a point from a parity bit (`0` = even Y, `1` = odd Y)
    /// and the 32-byte X coordinate, as used by control blocks (§3).
    pub fn from_parity_and_x(parity: u8, x: &[u8; 32]) -> Result<Self, PrimitivesError> {
        let prefix = if parity == 0 { 0x02 } else { 0x03 };
        let mut bytes = [0u8; 33];
        bytes[0] = prefix;
        bytes[1..].copy_from_slice(x);
        Self::from_compressed(&bytes)
    }
}

fn field_prime() -> BigUint {
    BigUint::parse_bytes(FIELD_PRIME_HEX.as_bytes(), 16).expect("valid hex constant")
}

impl PartialEq for Point {
    // Structural equality on the compressed form (§3).
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}
impl Eq for Point {}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Point({})", hex_encode(&self.to_compressed()))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
