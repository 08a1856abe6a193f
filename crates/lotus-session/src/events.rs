//! The observable event surface of §4.6.6: a flat enum the coordinator
//! emits and the application subscribes to, rather than callbacks or
//! virtual dispatch (§9: "dynamic dispatch... switched on an enum
//! discriminant").

use lotus_schnorr::Signature;

use crate::SessionId;

/// One occurrence on the event surface named by §4.6.6.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Created {
        session_id: SessionId,
    },
    Joined {
        session_id: SessionId,
        signer_index: usize,
    },
    NonceReceived {
        session_id: SessionId,
        signer_index: usize,
    },
    AllNoncesCollected {
        session_id: SessionId,
    },
    PartialSigReceived {
        session_id: SessionId,
        signer_index: usize,
    },
    AllPartialsCollected {
        session_id: SessionId,
    },
    ShouldBroadcast {
        session_id: SessionId,
        signature: Signature,
    },
    BroadcastConfirmed {
        session_id: SessionId,
        txid: Option<String>,
    },
    CoordinatorFailed {
        session_id: SessionId,
        failed_coordinator: usize,
    },
    FailoverExhausted {
        session_id: SessionId,
    },
    Completed {
        session_id: SessionId,
    },
    Failed {
        session_id: SessionId,
        reason: String,
    },
    Aborted {
        session_id: SessionId,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::Created { session_id }
            | SessionEvent::Joined { session_id, .. }
            | SessionEvent::NonceReceived { session_id, .. }
            | SessionEvent::AllNoncesCollected { session_id }
            | SessionEvent::PartialSigReceived { session_id, .. }
            | SessionEvent::AllPartialsCollected { session_id }
            | SessionEvent::ShouldBroadcast { session_id, .. }
            | SessionEvent::BroadcastConfirmed { session_id, .. }
            | SessionEvent::CoordinatorFailed { session_id, .. }
            | SessionEvent::FailoverExhausted { session_id }
            | SessionEvent::Completed { session_id }
            | SessionEvent::Failed { session_id, .. }
            | SessionEvent::Aborted { session_id } => *session_id,
        }
    }
}

/// Observer-pattern subscription handle: a bounded channel receiver.
/// Dropping it is how an application cancels its interest in events
/// (§5: "cancel... by dropping its subscribers").
pub type EventSubscriber = tokio::sync::mpsc::UnboundedReceiver<SessionEvent>;
