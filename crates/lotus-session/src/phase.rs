//! Session state machine phases and transition legality (§4.6.1).

use serde::{Deserialize, Serialize};

/// One of the seven states of §3/§4.6.1. `Complete`, `Failed`, and
/// `Aborted` are terminal: once reached, the phase never changes again
/// (§3 invariant 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    Setup,
    NonceExchange,
    PartialSigExchange,
    Broadcasting,
    Complete,
    Failed,
    Aborted,
}

impl SessionPhase {
    /// `true` for the three states the diagram in §4.6.1 marks `(T)`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::Complete | SessionPhase::Failed | SessionPhase::Aborted
        )
    }

    /// Whether advancing from `self` to `next` is a legal edge of the
    /// §4.6.1 diagram. Phase transitions are monotone except into the two
    /// non-`Complete` terminal states, which are reachable from any
    /// non-terminal phase (abort/failure can happen at any point before
    /// completion).
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (SessionPhase::Setup, SessionPhase::NonceExchange) => true,
            (SessionPhase::NonceExchange, SessionPhase::PartialSigExchange) => true,
            (SessionPhase::PartialSigExchange, SessionPhase::Broadcasting) => true,
            (SessionPhase::Broadcasting, SessionPhase::Complete) => true,
            (_, SessionPhase::Failed) => true,
            (_, SessionPhase::Aborted) => true,
            _ => false,
        }
    }
}
