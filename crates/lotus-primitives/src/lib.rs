//! secp256k1 field/curve primitives and tagged hashing (component C1).
//!
//! Every other crate in this workspace builds on the [`Scalar`]/[`Point`]
//! types here rather than touching `k256` directly, so the Lotus
//! non-BIP340 conventions (33-byte compressed keys, quadratic-residue
//! nonce rules) stay centralized in one place.

pub mod error;
pub mod hash;
pub mod merkle;
pub mod point;
pub mod scalar;
pub mod tx;
pub mod varint;

pub use error::PrimitivesError;
pub use hash::{sha256, sha256d, tagged_hash, tagged_hash_scalar};
pub use merkle::merkle_root;
pub use point::Point;
pub use scalar::Scalar;
pub use tx::{OutPoint, Transaction, TxIn, TxOut};
