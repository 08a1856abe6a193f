use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaprootError {
    #[error("primitive error: {0}")]
    Primitive(#[from] lotus_primitives::PrimitivesError),

    #[error("script is not a Taproot output")]
    NotTaproot,

    #[error("invalid Taproot tree structure: {0}")]
    InvalidTreeStructure(String),

    #[error("Taproot tree exceeds the maximum depth of 128")]
    TreeTooDeep,

    #[error("invalid control block: {0}")]
    InvalidControlBlock(String),
}
