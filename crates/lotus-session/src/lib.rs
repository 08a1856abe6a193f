//! Session state machine and P2P coordination for Lotus MuSig2 signing
//! (component C6).
//!
//! Event-driven with zero internal timers (§5, §4.6): every timeout,
//! retry, and cleanup sweep is triggered by an explicit call from the
//! embedding application, never by a library-owned clock.

pub mod coordinator;
pub mod config;
pub mod election;
pub mod error;
pub mod events;
pub mod hex_codec;
pub mod message;
pub mod participant;
pub mod phase;
pub mod reputation;
pub mod session;
pub mod validation;

pub use config::{DhtPeerInfoMapper, SessionConfig};
pub use coordinator::{MessageOutcome, SessionCoordinator, SessionParams};
pub use error::SessionError;
pub use events::{EventSubscriber, SessionEvent};
pub use participant::Participant;
pub use phase::SessionPhase;

/// A session's 32-byte deterministic identifier (§3).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub [u8; 32]);

impl SessionId {
    /// `session_id = SHA256(sorted-independent inputs the creator commits
    /// to)`. The exact preimage is a coordination detail left to the
    /// application (e.g. a nonce plus the signer list); this just derives
    /// a deterministic 32-byte id from whatever the caller feeds it.
    pub fn derive(seed: &[u8]) -> Self {
        SessionId(lotus_primitives::sha256(seed))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionId({})", hex::encode(self.0))
    }
}
