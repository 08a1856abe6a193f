//! Session participant records (§3: `participants`).

use lotus_primitives::Point;

/// One signer's seat in a session: its position in the MuSig2 key-agg
/// ordering, the transport-layer peer id that's allowed to speak for it,
/// and its public key. Per §3 invariant 2 a participant appears at most
/// once per session — enforced by [`crate::session::Session::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub signer_index: usize,
    pub peer_id: String,
    pub public_key: Point,
}
