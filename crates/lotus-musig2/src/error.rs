use thiserror::Error;

/// Errors raised by the MuSig2 core (component C5).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusigError {
    #[error("primitive error: {0}")]
    Primitive(#[from] lotus_primitives::PrimitivesError),

    #[error("schnorr error: {0}")]
    Schnorr(#[from] lotus_schnorr::SchnorrError),

    #[error("key aggregation requires at least one public key")]
    EmptyPublicKeyList,

    #[error("nonce aggregation requires at least one public nonce")]
    EmptyNonceList,

    #[error("signature aggregation requires at least one partial signature")]
    EmptyPartialSignatureList,

    #[error("signer index {0} is out of range for this key aggregation context")]
    SignerIndexOutOfRange(usize),

    #[error("aggregated signature does not verify against the aggregated key")]
    AggregatedSignatureInvalid,
}
