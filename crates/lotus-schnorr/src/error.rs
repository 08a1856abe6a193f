use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchnorrError {
    #[error("primitive error: {0}")]
    Primitive(#[from] lotus_primitives::PrimitivesError),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("invalid signature")]
    InvalidSignature,
}
