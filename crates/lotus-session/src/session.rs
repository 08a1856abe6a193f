//! The `Session` entity (§3), owned by the coordinator's arena (§9) and
//! mutated only by the single task driving its state machine (§5).

use std::collections::{BTreeMap, BTreeSet};

use lotus_musig2::{
    musig_nonce_agg, musig_nonce_gen, musig_partial_sig_verify, musig_sig_agg, AggregatedNonce,
    KeyAggContext, PublicNonce, SecretNonce,
};
use lotus_primitives::Scalar;
use lotus_schnorr::Signature;
use zeroize::Zeroize;

use crate::election::{elect_coordinator, ElectionMethod, ElectionResult};
use crate::error::SessionError;
use crate::participant::Participant;
use crate::phase::SessionPhase;
use crate::SessionId;

/// The local process's view of and part in a signing session (§3).
///
/// Holds every participant's *public* contributions (nonces, partial
/// signatures, broadcast acks) plus, if this process is itself a signer,
/// its own private key and in-flight secret nonce. The latter two are
/// zeroized on drop (§3 invariant 5, §4.6.6).
pub struct Session {
    pub session_id: SessionId,
    pub participants: Vec<Participant>,
    pub election: Option<ElectionResult>,
    pub coordinator_index: usize,
    pub message: [u8; 32],
    pub key_agg_ctx: KeyAggContext,
    pub phase: SessionPhase,

    public_nonces: BTreeMap<usize, PublicNonce>,
    partial_sigs: BTreeMap<usize, Scalar>,
    broadcast_acks: BTreeSet<usize>,
    agg_nonce: Option<AggregatedNonce>,
    final_signature: Option<Signature>,

    own_signer_index: Option<usize>,
    own_privkey: Option<Scalar>,
    own_secret_nonce: Option<SecretNonce>,

    pub created_at_ms: u64,
    pub last_activity_at_ms: u64,
    pub stuck_since_ms: Option<u64>,
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(sk) = &mut self.own_privkey {
            sk.zeroize();
        }
        // own_secret_nonce zeroizes itself via its own Drop impl.
    }
}

impl Session {
    /// Construct a new session in `Setup`, electing a coordinator if
    /// `enable_coordinator_election` is set (otherwise the creator —
    /// participant 0 in `participants` — is the coordinator, §6).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        participants: Vec<Participant>,
        message: [u8; 32],
        key_agg_ctx: KeyAggContext,
        own_signer_index: Option<usize>,
        own_privkey: Option<Scalar>,
        enable_coordinator_election: bool,
        salt: &[u8],
        now_ms: u64,
    ) -> Result<Self, SessionError> {
        let mut seen_peers = std::collections::HashSet::new();
        for participant in &participants {
            if !seen_peers.insert(participant.peer_id.clone()) {
                return Err(SessionError::Validation(format!(
                    "peer {} appears more than once in the participant list",
                    participant.peer_id
                )));
            }
        }

        let (election, coordinator_index) = if enable_coordinator_election {
            let result = elect_coordinator(
                &session_id,
                &participants,
                salt,
                ElectionMethod::DeterministicHash,
            );
            let coordinator = result.coordinator_index();
            (Some(result), coordinator)
        } else {
            (None, 0)
        };

        Ok(Session {
            session_id,
            participants,
            election,
            coordinator_index,
            message,
            key_agg_ctx,
            phase: SessionPhase::Setup,
            public_nonces: BTreeMap::new(),
            partial_sigs: BTreeMap::new(),
            broadcast_acks: BTreeSet::new(),
            agg_nonce: None,
            final_signature: None,
            own_signer_index,
            own_privkey,
            own_secret_nonce: None,
            created_at_ms: now_ms,
            last_activity_at_ms: now_ms,
            stuck_since_ms: None,
        })
    }

    fn transition(&mut self, next: SessionPhase) -> Result<(), SessionError> {
        if !self.phase.can_transition_to(next) {
            return Err(SessionError::WrongPhase {
                session: self.session_id,
                phase: self.phase,
            });
        }
        log::info!(
            "session {} phase {:?} -> {:?}",
            self.session_id,
            self.phase,
            next
        );
        self.phase = next;
        Ok(())
    }

    fn touch(&mut self, now_ms: u64) {
        self.last_activity_at_ms = now_ms;
        self.stuck_since_ms = None;
    }

    fn participant_by_signer_index(&self, signer_index: usize) -> Result<&Participant, SessionError> {
        self.participants
            .iter()
            .find(|p| p.signer_index == signer_index)
            .ok_or(SessionError::Protocol(format!(
                "signer index {signer_index} is not a participant of session {}",
                self.session_id
            )))
    }

    /// This process's own seat in the session, if it is a signer.
    pub fn own_signer_index(&self) -> Option<usize> {
        self.own_signer_index
    }

    /// §3 invariant 1: the sender's claimed `signer_index` must resolve to
    /// a participant whose `peer_id` matches `from`.
    pub fn verify_sender(&self, signer_index: usize, from: &str) -> Result<(), SessionError> {
        let participant = self.participant_by_signer_index(signer_index)?;
        if participant.peer_id != from {
            return Err(SessionError::ByzantineFault {
                peer: from.to_string(),
                reason: format!(
                    "claimed signer index {signer_index} belongs to peer {}",
                    participant.peer_id
                ),
            });
        }
        Ok(())
    }

    /// `submit_nonce(session_id)` (§6): generate this process's own nonce
    /// pair and record its public half, advancing `Setup` ->
    /// `NonceExchange` on first use.
    pub fn submit_own_nonce(
        &mut self,
        now_ms: u64,
        rng: &mut (impl rand::RngCore + rand::CryptoRng),
    ) -> Result<PublicNonce, SessionError> {
        let signer_index = self.own_signer_index.ok_or_else(|| {
            SessionError::Protocol("this session has no local signer to generate a nonce for".into())
        })?;
        let privkey = self
            .own_privkey
            .clone()
            .ok_or_else(|| SessionError::Protocol("no local private key available".into()))?;

        let (secret_nonce, public_nonce) = musig_nonce_gen(
            &privkey,
            &self.key_agg_ctx.aggregated_pubkey,
            &self.message,
            None,
            rng,
        );
        self.own_secret_nonce = Some(secret_nonce);
        self.record_public_nonce(signer_index, public_nonce.clone(), now_ms)?;
        Ok(public_nonce)
    }

    /// Record an inbound (or locally generated) public nonce. Rejects a
    /// second, *different* nonce from a signer that already submitted one
    /// — equivocation, a byzantine fault (§4.6.5).
    pub fn record_public_nonce(
        &mut self,
        signer_index: usize,
        nonce: PublicNonce,
        now_ms: u64,
    ) -> Result<bool, SessionError> {
        if self.phase != SessionPhase::Setup && self.phase != SessionPhase::NonceExchange {
            return Err(SessionError::WrongPhase {
                session: self.session_id,
                phase: self.phase,
            });
        }
        let participant = self.participant_by_signer_index(signer_index)?;
        if let Some(existing) = self.public_nonces.get(&signer_index) {
            if *existing != nonce {
                return Err(SessionError::ByzantineFault {
                    peer: participant.peer_id.clone(),
                    reason: "submitted two different public nonces for the same session".into(),
                });
            }
            return Ok(self.all_nonces_collected());
        }

        if self.phase == SessionPhase::Setup {
            self.transition(SessionPhase::NonceExchange)?;
        }
        self.public_nonces.insert(signer_index, nonce);
        self.touch(now_ms);

        if self.all_nonces_collected() {
            let ordered: Vec<PublicNonce> = self
                .participants
                .iter()
                .map(|p| self.public_nonces[&p.signer_index].clone())
                .collect();
            self.agg_nonce = Some(musig_nonce_agg(&ordered)?);
            self.transition(SessionPhase::PartialSigExchange)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn all_nonces_collected(&self) -> bool {
        self.participants
            .iter()
            .all(|p| self.public_nonces.contains_key(&p.signer_index))
    }

    /// `submit_partial_sig(session_id)` (§6): consume this process's own
    /// secret nonce (bound to exactly this call, §3 invariant 5) and
    /// produce its partial signature share.
    pub fn submit_own_partial_sig(&mut self, now_ms: u64) -> Result<Scalar, SessionError> {
        let signer_index = self.own_signer_index.ok_or_else(|| {
            SessionError::Protocol("this session has no local signer to partial-sign with".into())
        })?;
        let privkey = self
            .own_privkey
            .clone()
            .ok_or_else(|| SessionError::Protocol("no local private key available".into()))?;
        let secret_nonce = self.own_secret_nonce.take().ok_or_else(|| {
            SessionError::Protocol("no secret nonce pending for this signer".into())
        })?;
        let agg_nonce = self
            .agg_nonce
            .clone()
            .ok_or_else(|| SessionError::Protocol("nonces have not all been aggregated yet".into()))?;

        let partial = lotus_musig2::musig_partial_sign(
            secret_nonce,
            &privkey,
            &self.key_agg_ctx,
            signer_index,
            &agg_nonce,
            &self.message,
        )?;
        self.record_partial_sig(signer_index, partial.clone(), now_ms)?;
        Ok(partial)
    }

    /// Record an inbound partial signature. §4.6.5 step 4: a partial
    /// signature is cryptographically verified *before* acceptance; an
    /// invalid one is a byzantine fault, never silently aggregated.
    pub fn record_partial_sig(
        &mut self,
        signer_index: usize,
        partial_sig: Scalar,
        now_ms: u64,
    ) -> Result<bool, SessionError> {
        if self.phase != SessionPhase::PartialSigExchange {
            return Err(SessionError::WrongPhase {
                session: self.session_id,
                phase: self.phase,
            });
        }
        let participant = self.participant_by_signer_index(signer_index)?;
        let public_nonce = self
            .public_nonces
            .get(&signer_index)
            .ok_or_else(|| SessionError::Protocol(format!(
                "no public nonce on record for signer {signer_index}"
            )))?
            .clone();
        let agg_nonce = self
            .agg_nonce
            .clone()
            .ok_or_else(|| SessionError::Protocol("aggregated nonce not yet computed".into()))?;

        let ok = musig_partial_sig_verify(
            &partial_sig,
            &public_nonce,
            &participant.public_key,
            &self.key_agg_ctx,
            signer_index,
            &agg_nonce,
            &self.message,
        )?;
        if !ok {
            return Err(SessionError::ByzantineFault {
                peer: participant.peer_id.clone(),
                reason: "partial signature failed verification".into(),
            });
        }

        if let Some(existing) = self.partial_sigs.get(&signer_index) {
            if *existing != partial_sig {
                return Err(SessionError::ByzantineFault {
                    peer: participant.peer_id.clone(),
                    reason: "submitted two different partial signatures for the same session".into(),
                });
            }
            return Ok(self.all_partials_collected());
        }

        self.partial_sigs.insert(signer_index, partial_sig);
        self.touch(now_ms);

        if self.all_partials_collected() {
            self.finalize()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn all_partials_collected(&self) -> bool {
        self.participants
            .iter()
            .all(|p| self.partial_sigs.contains_key(&p.signer_index))
    }

    fn finalize(&mut self) -> Result<(), SessionError> {
        let ordered: Vec<Scalar> = self
            .participants
            .iter()
            .map(|p| self.partial_sigs[&p.signer_index].clone())
            .collect();
        let agg_nonce = self
            .agg_nonce
            .clone()
            .ok_or_else(|| SessionError::Protocol("aggregated nonce not yet computed".into()))?;
        let signature = musig_sig_agg(&ordered, &agg_nonce, &self.message, &self.key_agg_ctx)?;
        self.final_signature = Some(signature);
        self.transition(SessionPhase::Broadcasting)
    }

    /// `get_final_signature(session_id)` (§6): only available once
    /// finalized.
    pub fn final_signature(&self) -> Result<Signature, SessionError> {
        if self.phase != SessionPhase::Broadcasting && self.phase != SessionPhase::Complete {
            return Err(SessionError::WrongPhase {
                session: self.session_id,
                phase: self.phase,
            });
        }
        self.final_signature
            .ok_or_else(|| SessionError::Protocol("signature not yet finalized".into()))
    }

    pub fn record_broadcast_ack(&mut self, signer_index: usize, now_ms: u64) -> Result<(), SessionError> {
        self.participant_by_signer_index(signer_index)?;
        self.broadcast_acks.insert(signer_index);
        self.touch(now_ms);
        Ok(())
    }

    /// `notifyBroadcastComplete(session_id)` (§6/§4.6.6).
    pub fn notify_broadcast_complete(&mut self) -> Result<(), SessionError> {
        self.transition(SessionPhase::Complete)
    }

    pub fn mark_failed(&mut self, reason: &str) {
        log::warn!("session {} failed: {reason}", self.session_id);
        // Failed is reachable from any non-terminal phase; ignore an
        // already-terminal session rather than erroring the caller.
        let _ = self.transition(SessionPhase::Failed);
    }

    pub fn mark_aborted(&mut self) -> Result<(), SessionError> {
        self.transition(SessionPhase::Aborted)
    }

    /// §4.6.6: a session is "stuck" once `last_activity_at` is older than
    /// `stuck_session_timeout`.
    pub fn mark_stuck_if_expired(&mut self, now_ms: u64, timeout_ms: u64) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        if now_ms.saturating_sub(self.last_activity_at_ms) >= timeout_ms {
            self.stuck_since_ms.get_or_insert(now_ms);
            true
        } else {
            false
        }
    }

    /// §4.6.3: advance to the next coordinator in the priority list. Fails
    /// with `Exhausted` (and moves the session to `Failed`) once the list
    /// runs out.
    pub fn trigger_failover(&mut self) -> Result<usize, SessionError> {
        let election = self.election.as_ref().ok_or_else(|| {
            SessionError::Protocol("coordinator election is disabled for this session".into())
        })?;
        match election.next_after(self.coordinator_index) {
            Some(next) => {
                log::info!(
                    "session {} coordinator failover: {} -> {next}",
                    self.session_id,
                    self.coordinator_index
                );
                self.coordinator_index = next;
                Ok(next)
            }
            None => {
                self.mark_failed("coordinator failover list exhausted");
                Err(SessionError::Exhausted(
                    "no further coordinators to fail over to".into(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotus_musig2::KeyAggContext;
    use lotus_primitives::Point;

    fn keypair(byte: u8) -> (Scalar, Point) {
        let sk = Scalar::from_bytes_nonzero(&[byte; 32]).unwrap();
        let pk = Point::from_scalar_mul_generator(&sk);
        (sk, pk)
    }

    fn two_party_session(enable_election: bool) -> (Session, Session, Scalar, Scalar) {
        let (sk_a, pk_a) = keypair(0x01);
        let (sk_b, pk_b) = keypair(0x02);
        let key_agg = KeyAggContext::new(vec![pk_a.clone(), pk_b.clone()]).unwrap();
        let participants = vec![
            Participant {
                signer_index: 0,
                peer_id: "alice".into(),
                public_key: pk_a,
            },
            Participant {
                signer_index: 1,
                peer_id: "bob".into(),
                public_key: pk_b,
            },
        ];
        let session_id = SessionId([0x77; 32]);
        let message = [0x42u8; 32];

        let session_a = Session::new(
            session_id,
            participants.clone(),
            message,
            key_agg.clone(),
            Some(0),
            Some(sk_a.clone()),
            enable_election,
            b"salt",
            1_000,
        )
        .unwrap();
        let session_b = Session::new(
            session_id,
            participants,
            message,
            key_agg,
            Some(1),
            Some(sk_b.clone()),
            enable_election,
            b"salt",
            1_000,
        )
        .unwrap();
        (session_a, session_b, sk_a, sk_b)
    }

    #[test]
    fn rejects_duplicate_peer_ids() {
        let (_sk, pk) = keypair(0x01);
        let participants = vec![
            Participant {
                signer_index: 0,
                peer_id: "alice".into(),
                public_key: pk.clone(),
            },
            Participant {
                signer_index: 1,
                peer_id: "alice".into(),
                public_key: pk,
            },
        ];
        let key_agg = KeyAggContext::new(vec![Point::generator(), Point::generator()]).unwrap();
        let result = Session::new(
            SessionId([0; 32]),
            participants,
            [0u8; 32],
            key_agg,
            None,
            None,
            false,
            b"",
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn full_two_party_signing_flow_reaches_broadcasting() {
        let (mut session_a, mut session_b, _sk_a, _sk_b) = two_party_session(false);
        let mut rng = rand::rngs::OsRng;

        let nonce_a = session_a.submit_own_nonce(2_000, &mut rng).unwrap();
        let nonce_b = session_b.submit_own_nonce(2_000, &mut rng).unwrap();

        let a_complete = session_a.record_public_nonce(1, nonce_b, 2_100).unwrap();
        let b_complete = session_b.record_public_nonce(0, nonce_a, 2_100).unwrap();
        assert!(a_complete);
        assert!(b_complete);
        assert_eq!(session_a.phase, SessionPhase::PartialSigExchange);
        assert_eq!(session_b.phase, SessionPhase::PartialSigExchange);

        let partial_a = session_a.submit_own_partial_sig(2_200).unwrap();
        let partial_b = session_b.submit_own_partial_sig(2_200).unwrap();

        let a_done = session_a.record_partial_sig(1, partial_b, 2_300).unwrap();
        let b_done = session_b.record_partial_sig(0, partial_a, 2_300).unwrap();
        assert!(a_done);
        assert!(b_done);

        assert_eq!(session_a.phase, SessionPhase::Broadcasting);
        assert_eq!(session_b.phase, SessionPhase::Broadcasting);
        assert_eq!(
            session_a.final_signature().unwrap(),
            session_b.final_signature().unwrap()
        );
    }

    #[test]
    fn equivocating_nonce_is_a_byzantine_fault() {
        let (mut session_a, _session_b, _sk_a, _sk_b) = two_party_session(false);
        let mut rng = rand::rngs::OsRng;
        let nonce_1 = session_a.submit_own_nonce(1_000, &mut rng).unwrap();
        let mut nonce_2 = nonce_1.clone();
        nonce_2.r1 = nonce_2.r2.clone();
        let result = session_a.record_public_nonce(0, nonce_2, 1_100);
        let err = result.unwrap_err();
        assert!(matches!(err, SessionError::ByzantineFault { .. }));
        // A caller that observes a byzantine fault is responsible for
        // failing the session (the coordinator does this for inbound
        // messages); verify that transition is reachable from here.
        session_a.mark_failed(&err.to_string());
        assert_eq!(session_a.phase, SessionPhase::Failed);
    }

    #[test]
    fn wrong_phase_partial_sig_is_rejected() {
        let (mut session_a, _session_b, _sk_a, _sk_b) = two_party_session(false);
        let result = session_a.record_partial_sig(0, Scalar::one(), 1_000);
        assert!(matches!(result, Err(SessionError::WrongPhase { .. })));
    }

    #[test]
    fn failover_exhausts_after_walking_the_whole_priority_list() {
        let (mut session_a, _session_b, _sk_a, _sk_b) = two_party_session(true);
        let first = session_a.trigger_failover().unwrap();
        assert_ne!(first, session_a.election.as_ref().unwrap().priority[0]);
        let result = session_a.trigger_failover();
        assert!(matches!(result, Err(SessionError::Exhausted(_))));
        assert_eq!(session_a.phase, SessionPhase::Failed);
    }

    #[test]
    fn stuck_detection_respects_last_activity() {
        let (mut session_a, _session_b, _sk_a, _sk_b) = two_party_session(false);
        assert!(!session_a.mark_stuck_if_expired(1_500, 1_000));
        assert!(session_a.mark_stuck_if_expired(5_000, 1_000));
    }
}
