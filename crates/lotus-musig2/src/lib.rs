//! Two-round MuSig2 multisignature core, adapted to Lotus's non-BIP340
//! Schnorr variant (component C5, §4.5).
//!
//! Built on [`lotus_primitives`] scalars/points and [`lotus_schnorr`]'s
//! challenge/signature types rather than reimplementing either.

pub mod error;
pub mod key_agg;
pub mod nonce;
pub mod partial_sign;
pub mod sig_agg;

pub use error::MusigError;
pub use key_agg::KeyAggContext;
pub use nonce::{musig_nonce_gen, musig_nonce_agg, AggregatedNonce, PublicNonce, SecretNonce};
pub use partial_sign::{musig_partial_sig_verify, musig_partial_sign};
pub use sig_agg::musig_sig_agg;
