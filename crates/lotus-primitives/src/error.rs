use thiserror::Error;

/// Errors raised by field/curve primitives (component C1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitivesError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("point is not on the secp256k1 curve")]
    PointNotOnCurve,

    #[error("point at infinity is not valid in this context")]
    PointAtInfinity,

    #[error("scalar is zero where a non-zero value is required")]
    ZeroScalar,
}
