//! Session/coordination error taxonomy (component C6, §7).
//!
//! §7 names eight error kinds; `InvalidEncoding` and `InvalidCrypto` live in
//! `lotus-primitives`/`lotus-schnorr`, `InvalidSighashType` in
//! `lotus-sighash`. The remaining five — `ProtocolError`, `ValidationError`,
//! `ByzantineFault`, `TransientNetwork`, `Exhausted` — are this component's
//! own, plus `#[from]` wrapping of the lower crates' errors so a single
//! `Result<_, SessionError>` can flow through the coordinator's public API.

use thiserror::Error;

use crate::phase::SessionPhase;
use crate::SessionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("primitive error: {0}")]
    Primitive(#[from] lotus_primitives::PrimitivesError),

    #[error("schnorr error: {0}")]
    Schnorr(#[from] lotus_schnorr::SchnorrError),

    #[error("musig2 error: {0}")]
    Musig(#[from] lotus_musig2::MusigError),

    /// §7.4: out-of-phase message, unknown session, wrong signer index.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// §7.5: payload structurally well-formed but semantically invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// §7.6: equivocation or an invalid partial signature. Fatal to the
    /// session, never to the process (§4.6.7).
    #[error("byzantine fault by {peer}: {reason}")]
    ByzantineFault { peer: String, reason: String },

    /// §7.7: unreachable peer, broadcast I/O failure. Retriable by the
    /// application.
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// §7.8: failover list exhausted, or session expired.
    #[error("exhausted: {0}")]
    Exhausted(String),

    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    #[error("session {session} is in phase {phase:?}, which does not permit this operation")]
    WrongPhase {
        session: SessionId,
        phase: SessionPhase,
    },

    #[error("message exceeds the configured maximum size of {limit} bytes ({actual} bytes)")]
    MessageTooLarge { limit: usize, actual: usize },
}

impl SessionError {
    /// §4.6.5 step 5 / §7: failures surfaced while handling an inbound
    /// message must never propagate out of the handler — they are logged,
    /// penalized, and dropped. This distinguishes which failures apply a
    /// reputation penalty from transient ones that don't reflect on the
    /// sender.
    pub fn is_attributable_fault(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_)
                | SessionError::ByzantineFault { .. }
                | SessionError::Protocol(_)
                | SessionError::MessageTooLarge { .. }
        )
    }
}
