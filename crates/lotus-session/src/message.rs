//! The P2P message protocol (§4.6.4, §6): envelope, payload variants, and
//! a bounded message-id dedup window. Uses a tagged-enum envelope over
//! JSON, keeping the wire shape and dispatch logic in one place per
//! payload variant.

use std::collections::VecDeque;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::hex_codec;
use crate::SessionId;

/// Protocol identifier carried on every message (§4.6.4).
pub const PROTOCOL_ID: &str = "/lotus/musig2/1.0.0";

/// Wire form of a [`crate::SessionId`]: lowercase hex, no `0x` prefix (§6).
pub fn session_id_to_hex(id: &SessionId) -> String {
    hex::encode(id.0)
}

pub fn session_id_from_hex(s: &str) -> Result<SessionId, crate::error::SessionError> {
    Ok(SessionId(hex_codec::decode_digest(s)?))
}

/// A `(R1, R2)` public nonce pair as it appears on the wire (§6): 33-byte
/// compressed points, hex-encoded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WirePublicNonce {
    pub r1: String,
    pub r2: String,
}

impl WirePublicNonce {
    pub fn from_public_nonce(nonce: &lotus_musig2::PublicNonce) -> Self {
        Self {
            r1: hex_codec::encode_point(&nonce.r1),
            r2: hex_codec::encode_point(&nonce.r2),
        }
    }

    pub fn to_public_nonce(&self) -> Result<lotus_musig2::PublicNonce, crate::error::SessionError> {
        Ok(lotus_musig2::PublicNonce {
            r1: hex_codec::decode_point(&self.r1)?,
            r2: hex_codec::decode_point(&self.r2)?,
        })
    }
}

/// §4.6.4 `session-announce`: a coordinator proposing a new session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionAnnouncePayload {
    pub session_id: String,
    pub signers: Vec<String>,
    pub message: String,
}

/// §4.6.4 `session-join`: a participant accepting a session-announce.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionJoinPayload {
    pub session_id: String,
    pub signer_index: usize,
}

/// §6 `nonce-share`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NonceSharePayload {
    pub session_id: String,
    pub signer_index: usize,
    pub public_nonce: WirePublicNonce,
}

/// §6 `partial-sig-share`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialSigSharePayload {
    pub session_id: String,
    pub signer_index: usize,
    pub partial_sig: String,
}

/// §6 `broadcast-complete`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BroadcastCompletePayload {
    pub session_id: String,
    pub txid: String,
}

/// §4.6.4 `session-abort`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionAbortPayload {
    pub session_id: String,
    pub reason: String,
}

/// §4.6.4 `participant-dropped`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantDroppedPayload {
    pub session_id: String,
    pub signer_index: usize,
}

/// The seven MuSig2 message types named by §4.6.4, dispatched on a
/// `"type"` tag rather than virtual dispatch (§9).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MessagePayload {
    #[serde(rename = "session-announce")]
    SessionAnnounce(SessionAnnouncePayload),
    #[serde(rename = "session-join")]
    SessionJoin(SessionJoinPayload),
    #[serde(rename = "nonce-share")]
    NonceShare(NonceSharePayload),
    #[serde(rename = "partial-sig-share")]
    PartialSigShare(PartialSigSharePayload),
    #[serde(rename = "broadcast-complete")]
    BroadcastComplete(BroadcastCompletePayload),
    #[serde(rename = "session-abort")]
    SessionAbort(SessionAbortPayload),
    #[serde(rename = "participant-dropped")]
    ParticipantDropped(ParticipantDroppedPayload),
}

impl MessagePayload {
    pub fn session_id_hex(&self) -> &str {
        match self {
            MessagePayload::SessionAnnounce(p) => &p.session_id,
            MessagePayload::SessionJoin(p) => &p.session_id,
            MessagePayload::NonceShare(p) => &p.session_id,
            MessagePayload::PartialSigShare(p) => &p.session_id,
            MessagePayload::BroadcastComplete(p) => &p.session_id,
            MessagePayload::SessionAbort(p) => &p.session_id,
            MessagePayload::ParticipantDropped(p) => &p.session_id,
        }
    }
}

/// The full message envelope of §4.6.4/§6.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub payload: MessagePayload,
    /// Milliseconds since epoch (§6).
    pub timestamp: u64,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl Message {
    pub fn to_json(&self) -> Result<String, crate::error::SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Validation(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self, crate::error::SessionError> {
        serde_json::from_str(s).map_err(|e| SessionError::Validation(e.to_string()))
    }

    /// §4.6.4: "maximum serialized size is a configurable limit... oversized
    /// messages are dropped."
    pub fn check_size(&self, max_bytes: usize) -> Result<(), crate::error::SessionError> {
        let encoded = self.to_json()?;
        if encoded.len() > max_bytes {
            return Err(SessionError::MessageTooLarge {
                limit: max_bytes,
                actual: encoded.len(),
            });
        }
        Ok(())
    }
}

/// Bounded message-id dedup window (§4.6.4: "deduplicated by `message_id`
/// within a TTL window"). Modeled as a fixed-capacity FIFO plus set rather
/// than a time-indexed structure, since the library has no internal clock
/// (§5/§4.6): insertion order stands in for recency, and the oldest entry
/// is evicted once capacity is exceeded.
pub struct MessageDedupWindow {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl MessageDedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Returns `true` if `message_id` had not been seen before (and
    /// records it); `false` if it's a duplicate within the window.
    pub fn observe(&mut self, message_id: &str) -> bool {
        if self.seen.contains(message_id) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(message_id.to_string());
        self.seen.insert(message_id.to_string());
        true
    }
}
