use thiserror::Error;

/// Errors raised by the SIGHASH engine (component C4).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SighashError {
    #[error("primitive error: {0}")]
    Primitive(#[from] lotus_primitives::PrimitivesError),

    #[error("invalid sighash type: {0}")]
    InvalidSighashType(String),

    #[error("input index {0} is out of range")]
    InputIndexOutOfRange(usize),

    #[error("SIGHASH_LOTUS requires one spent output per input")]
    SpentOutputsMismatch,

    #[error("SIGHASH_SINGLE with no matching output")]
    SingleMissingOutput,
}
