//! `SessionCoordinator`: the arena of active sessions (§9) and the only
//! public entry point named by §6 — `create_session`, `join_session`,
//! `submit_nonce`, `submit_partial_sig`, `get_final_signature`, the event
//! subscription API, and the three time-related controls
//! (`cleanupExpiredSessions`, `triggerCoordinatorFailover`,
//! `notifyBroadcastComplete`).
//!
//! Sessions are arena-owned and keyed by [`SessionId`]; participants and
//! peers never hold a direct reference to one another, avoiding the
//! reference cycles §9 calls out.

use std::collections::HashMap;
use std::sync::Arc;

use lotus_musig2::KeyAggContext;
use lotus_primitives::{Point, Scalar};
use lotus_schnorr::Signature;
use tokio::sync::mpsc;

use crate::election::verify_election_result;
use crate::error::SessionError;
use crate::events::{EventSubscriber, SessionEvent};
use crate::hex_codec;
use crate::message::{Message, MessagePayload, MessageDedupWindow};
use crate::participant::Participant;
use crate::phase::SessionPhase;
use crate::reputation::{InMemoryReputationStore, ReputationStore};
use crate::session::Session;
use crate::validation;
use crate::{SessionConfig, SessionId};

/// The inputs a local process needs to deterministically derive and build
/// a session, shared by `create_session` (the creator's path) and
/// `join_session` (every other participant's path) so both land on the
/// identical [`SessionId`] and [`KeyAggContext`].
pub struct SessionParams {
    pub participants: Vec<Participant>,
    pub message: [u8; 32],
    /// Taproot merkle root to tweak the aggregated key against, or
    /// `None` for a key-path-only aggregation (§4.5.7).
    pub taproot_merkle_root: Option<[u8; 32]>,
    pub salt: Vec<u8>,
    /// This process's own seat in `participants`, if it is a signer.
    pub own_signer_index: Option<usize>,
    pub own_privkey: Option<Scalar>,
}

impl SessionParams {
    fn session_id(&self) -> SessionId {
        let mut buf = Vec::new();
        for participant in &self.participants {
            buf.extend_from_slice(&participant.public_key.to_compressed());
        }
        buf.extend_from_slice(&self.message);
        buf.extend_from_slice(&self.salt);
        SessionId::derive(&buf)
    }

    fn key_agg_ctx(&self) -> Result<KeyAggContext, SessionError> {
        let pubkeys: Vec<Point> = self.participants.iter().map(|p| p.public_key.clone()).collect();
        let ctx = KeyAggContext::new(pubkeys)?;
        Ok(match self.taproot_merkle_root {
            Some(root) => ctx.with_taproot_tweak(&root),
            None => ctx,
        })
    }
}

/// Outcome of routing one inbound [`Message`] through
/// [`SessionCoordinator::handle_message`]. Never an `Err` the caller must
/// propagate (§7: handlers never propagate out of the receive path) —
/// `Dropped` already carries the applied penalty's cause for logging.
#[derive(Debug)]
pub enum MessageOutcome {
    Accepted,
    Duplicate,
    Dropped(SessionError),
}

pub struct SessionCoordinator {
    config: SessionConfig,
    sessions: HashMap<SessionId, Session>,
    reputation: Arc<dyn ReputationStore>,
    dedup: MessageDedupWindow,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionCoordinator {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            reputation: Arc::new(InMemoryReputationStore::default()),
            dedup: MessageDedupWindow::new(4096),
            subscribers: Vec::new(),
        }
    }

    pub fn with_reputation_store(mut self, store: Arc<dyn ReputationStore>) -> Self {
        self.reputation = store;
        self
    }

    /// Observer-pattern event subscription (§6).
    pub fn subscribe(&mut self) -> EventSubscriber {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn session_mut(&mut self, session_id: &SessionId) -> Result<&mut Session, SessionError> {
        self.sessions
            .get_mut(session_id)
            .ok_or(SessionError::UnknownSession(*session_id))
    }

    pub fn session(&self, session_id: &SessionId) -> Result<&Session, SessionError> {
        self.sessions
            .get(session_id)
            .ok_or(SessionError::UnknownSession(*session_id))
    }

    /// Current reputation score for a peer id, per §4.6.7.
    pub fn reputation_score(&self, peer: &str) -> i64 {
        self.reputation.score(peer)
    }

    /// `create_session(signers, message) -> session_id` (§6). Called by
    /// the process that originates the session.
    pub fn create_session(&mut self, params: SessionParams, now_ms: u64) -> Result<SessionId, SessionError> {
        let session_id = params.session_id();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::Protocol(format!(
                "session {session_id} already exists"
            )));
        }
        let key_agg_ctx = params.key_agg_ctx()?;
        let session = Session::new(
            session_id,
            params.participants,
            params.message,
            key_agg_ctx,
            params.own_signer_index,
            params.own_privkey,
            self.config.enable_coordinator_election,
            &params.salt,
            now_ms,
        )?;
        self.sessions.insert(session_id, session);
        self.emit(SessionEvent::Created { session_id });
        Ok(session_id)
    }

    /// `join_session(session_id) -> ()` (§6). Every non-creating
    /// participant derives the identical session deterministically from
    /// the same `params` (learned out-of-band from a `session-announce`)
    /// and registers it locally.
    pub fn join_session(&mut self, params: SessionParams, now_ms: u64) -> Result<SessionId, SessionError> {
        let session_id = params.session_id();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::Protocol(format!(
                "session {session_id} already joined"
            )));
        }
        let signer_index = params.own_signer_index.ok_or_else(|| {
            SessionError::Protocol("join_session requires a local signer index".into())
        })?;
        let key_agg_ctx = params.key_agg_ctx()?;
        let session = Session::new(
            session_id,
            params.participants,
            params.message,
            key_agg_ctx,
            params.own_signer_index,
            params.own_privkey,
            self.config.enable_coordinator_election,
            &params.salt,
            now_ms,
        )?;
        self.sessions.insert(session_id, session);
        self.emit(SessionEvent::Joined {
            session_id,
            signer_index,
        });
        Ok(session_id)
    }

    /// `submit_nonce(session_id)` (§6): wraps §4.5.2.
    pub fn submit_nonce(
        &mut self,
        session_id: &SessionId,
        now_ms: u64,
        rng: &mut (impl rand::RngCore + rand::CryptoRng),
    ) -> Result<lotus_musig2::PublicNonce, SessionError> {
        let session = self.session_mut(session_id)?;
        let own_signer_index = session_owner_index(session)?;
        let nonce = session.submit_own_nonce(now_ms, rng)?;
        self.emit(SessionEvent::NonceReceived {
            session_id: *session_id,
            signer_index: own_signer_index,
        });
        if self.session(session_id)?.phase == SessionPhase::PartialSigExchange {
            self.emit(SessionEvent::AllNoncesCollected {
                session_id: *session_id,
            });
        }
        Ok(nonce)
    }

    /// `submit_partial_sig(session_id)` (§6): wraps §4.5.4.
    pub fn submit_partial_sig(
        &mut self,
        session_id: &SessionId,
        now_ms: u64,
    ) -> Result<Scalar, SessionError> {
        let session = self.session_mut(session_id)?;
        let own_signer_index = session_owner_index(session)?;
        let partial = session.submit_own_partial_sig(now_ms)?;
        self.emit(SessionEvent::PartialSigReceived {
            session_id: *session_id,
            signer_index: own_signer_index,
        });
        let session = self.session(session_id)?;
        if session.phase == SessionPhase::Broadcasting {
            self.emit(SessionEvent::AllPartialsCollected {
                session_id: *session_id,
            });
            let signature = session.final_signature()?;
            self.emit(SessionEvent::ShouldBroadcast {
                session_id: *session_id,
                signature,
            });
        }
        Ok(partial)
    }

    /// `get_final_signature(session_id) -> signature` (§6): only valid in
    /// `Broadcasting` or `Complete`.
    pub fn get_final_signature(&self, session_id: &SessionId) -> Result<Signature, SessionError> {
        self.session(session_id)?.final_signature()
    }

    /// `notifyBroadcastComplete(session_id)` (§4.6, §6).
    pub fn notify_broadcast_complete(
        &mut self,
        session_id: &SessionId,
        txid: Option<String>,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(session_id)?;
        session.notify_broadcast_complete()?;
        self.emit(SessionEvent::BroadcastConfirmed {
            session_id: *session_id,
            txid,
        });
        self.emit(SessionEvent::Completed {
            session_id: *session_id,
        });
        Ok(())
    }

    /// `triggerCoordinatorFailover(session_id)` (§4.6.3, §6).
    pub fn trigger_coordinator_failover(&mut self, session_id: &SessionId) -> Result<usize, SessionError> {
        if !self.config.enable_coordinator_failover {
            return Err(SessionError::Protocol(
                "coordinator failover is disabled by configuration".into(),
            ));
        }
        let failed_coordinator = self.session(session_id)?.coordinator_index;
        let session = self.session_mut(session_id)?;
        match session.trigger_failover() {
            Ok(next) => {
                self.emit(SessionEvent::CoordinatorFailed {
                    session_id: *session_id,
                    failed_coordinator,
                });
                let session = self.session(session_id)?;
                if session.phase == SessionPhase::Broadcasting {
                    if let Ok(signature) = session.final_signature() {
                        self.emit(SessionEvent::ShouldBroadcast {
                            session_id: *session_id,
                            signature,
                        });
                    }
                }
                Ok(next)
            }
            Err(err) => {
                self.emit(SessionEvent::FailoverExhausted {
                    session_id: *session_id,
                });
                self.emit(SessionEvent::Failed {
                    session_id: *session_id,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// `cleanupExpiredSessions()` (§4.6.6, §6): drop every session whose
    /// `last_activity_at` predates `stuck_session_timeout_ms`. Returns the
    /// ids removed.
    pub fn cleanup_expired_sessions(&mut self, now_ms: u64) -> Vec<SessionId> {
        let timeout = self.config.stuck_session_timeout_ms;
        let mut expired = Vec::new();
        for (id, session) in self.sessions.iter_mut() {
            if session.mark_stuck_if_expired(now_ms, timeout) {
                if !session.phase.is_terminal() {
                    session.mark_failed("stuck session timeout exceeded");
                }
                expired.push(*id);
            }
        }
        for id in &expired {
            self.emit(SessionEvent::Failed {
                session_id: *id,
                reason: "stuck session timeout exceeded".into(),
            });
            self.sessions.remove(id);
        }
        expired
    }

    /// Route one inbound wire [`Message`] through the §4.6.5 byzantine
    /// validation pipeline and into the relevant session's state machine.
    /// Never propagates an error to the caller beyond reporting the
    /// dropped outcome: a validation or deserialization failure is logged,
    /// penalizes the sender's reputation, and the message is discarded
    /// (§4.6.5 step 5, §7).
    pub fn handle_message(&mut self, msg: Message, now_ms: u64) -> MessageOutcome {
        if !self.dedup.observe(&msg.message_id) {
            return MessageOutcome::Duplicate;
        }
        match self.try_handle_message(&msg, now_ms) {
            Ok(()) => MessageOutcome::Accepted,
            Err(err) => {
                if let Some(fault) = validation::fault_class_for(&err) {
                    self.reputation.penalize(&msg.from, fault);
                }
                log::warn!("dropping message {} from {}: {err}", msg.message_id, msg.from);
                if matches!(err, SessionError::ByzantineFault { .. }) {
                    if let Ok(session_id) = crate::message::session_id_from_hex(msg.payload.session_id_hex()) {
                        if let Ok(session) = self.session_mut(&session_id) {
                            if !session.phase.is_terminal() {
                                session.mark_failed(&err.to_string());
                                self.emit(SessionEvent::Failed {
                                    session_id,
                                    reason: err.to_string(),
                                });
                            }
                        }
                    }
                }
                MessageOutcome::Dropped(err)
            }
        }
    }

    fn try_handle_message(&mut self, msg: &Message, now_ms: u64) -> Result<(), SessionError> {
        validation::validate_structure(msg, &self.config)?;
        if self.reputation.is_banned(&msg.from) {
            return Err(SessionError::Validation(format!(
                "peer {} is banned",
                msg.from
            )));
        }

        match &msg.payload {
            MessagePayload::NonceShare(payload) => {
                let session_id = crate::message::session_id_from_hex(&payload.session_id)?;
                let session = self.session_mut(&session_id)?;
                session.verify_sender(payload.signer_index, &msg.from)?;
                let nonce = payload.public_nonce.to_public_nonce()?;
                let all_collected =
                    session.record_public_nonce(payload.signer_index, nonce, now_ms)?;
                self.emit(SessionEvent::NonceReceived {
                    session_id,
                    signer_index: payload.signer_index,
                });
                if all_collected {
                    self.emit(SessionEvent::AllNoncesCollected { session_id });
                }
                Ok(())
            }
            MessagePayload::PartialSigShare(payload) => {
                let session_id = crate::message::session_id_from_hex(&payload.session_id)?;
                let session = self.session_mut(&session_id)?;
                session.verify_sender(payload.signer_index, &msg.from)?;
                let partial = hex_codec::decode_scalar(&payload.partial_sig)?;
                let all_collected =
                    session.record_partial_sig(payload.signer_index, partial, now_ms)?;
                self.emit(SessionEvent::PartialSigReceived {
                    session_id,
                    signer_index: payload.signer_index,
                });
                if all_collected {
                    self.emit(SessionEvent::AllPartialsCollected { session_id });
                    let signature = self.session(&session_id)?.final_signature()?;
                    self.emit(SessionEvent::ShouldBroadcast {
                        session_id,
                        signature,
                    });
                }
                Ok(())
            }
            MessagePayload::BroadcastComplete(payload) => {
                let session_id = crate::message::session_id_from_hex(&payload.session_id)?;
                self.notify_broadcast_complete(&session_id, Some(payload.txid.clone()))
            }
            MessagePayload::SessionAbort(payload) => {
                let session_id = crate::message::session_id_from_hex(&payload.session_id)?;
                let session = self.session_mut(&session_id)?;
                session.mark_aborted()?;
                self.emit(SessionEvent::Aborted { session_id });
                Ok(())
            }
            MessagePayload::ParticipantDropped(payload) => {
                let session_id = crate::message::session_id_from_hex(&payload.session_id)?;
                // Informational: the application decides whether to
                // trigger a coordinator failover in response.
                let _ = self.session(&session_id)?;
                log::info!(
                    "participant {} reported dropped for session {session_id}",
                    payload.signer_index
                );
                Ok(())
            }
            MessagePayload::SessionAnnounce(_) | MessagePayload::SessionJoin(_) => {
                // These carry the out-of-band parameters an application
                // needs to call `join_session`/`create_session` itself;
                // the coordinator doesn't mutate the arena on their
                // receipt (§6: session construction needs a local
                // signing key the wire payload never carries).
                Ok(())
            }
        }
    }
}

fn session_owner_index(session: &Session) -> Result<usize, SessionError> {
    session
        .own_signer_index()
        .ok_or_else(|| SessionError::Protocol("session has no local signer".into()))
}

/// Recompute and check a coordinator election claim against a session's
/// participant list (§4.6.2 `verifyElectionResult`), exposed for
/// application-level peer challenges outside the session itself.
pub fn verify_claimed_election(
    session: &Session,
    salt: &[u8],
    claimed: &crate::election::ElectionResult,
) -> bool {
    verify_election_result(&session.session_id, &session.participants, salt, claimed)
}
