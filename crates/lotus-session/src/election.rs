//! Coordinator election and failover priority ordering (§4.6.2, §4.6.3).

use lotus_primitives::sha256;

use crate::participant::Participant;
use crate::SessionId;

/// §4.6.2 names `DeterministicHash` as the required method; other methods
/// are optional and not specified further, so this is the only one
/// implemented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElectionMethod {
    DeterministicHash,
}

/// `h = SHA256(session_id || P1 || ... || Pn || salt)`, reduced to a
/// coordinator index via `h_bigendian_u64 mod n`.
fn election_hash(session_id: &SessionId, participants: &[Participant], salt: &[u8], counter: u8) -> [u8; 32] {
    let mut buf = Vec::with_capacity(32 + participants.len() * 33 + salt.len() + 1);
    buf.extend_from_slice(&session_id.0);
    for participant in participants {
        buf.extend_from_slice(&participant.public_key.to_compressed());
    }
    buf.extend_from_slice(salt);
    buf.push(counter);
    sha256(&buf)
}

fn hash_to_index(hash: &[u8; 32], modulus: usize) -> usize {
    let mut be_bytes = [0u8; 8];
    be_bytes.copy_from_slice(&hash[..8]);
    (u64::from_be_bytes(be_bytes) % modulus as u64) as usize
}

/// The full priority ordering for a session: index 0 is the elected
/// coordinator, the rest is the backup list failover walks through in
/// order (§4.6.2 "a full priority ordering", §4.6.3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectionResult {
    pub method: ElectionMethod,
    pub priority: Vec<usize>,
}

impl ElectionResult {
    pub fn coordinator_index(&self) -> usize {
        self.priority[0]
    }

    /// The next entry in the priority list after `current`, or `None` if
    /// `current` was the last entry (§4.6.3: failover list exhausted).
    pub fn next_after(&self, current: usize) -> Option<usize> {
        let position = self.priority.iter().position(|&index| index == current)?;
        self.priority.get(position + 1).copied()
    }
}

/// `electCoordinator`: compute `h`, derive the primary coordinator index,
/// then build the rest of the priority list by rehashing with an
/// incrementing counter byte and walking indices in that hash's order,
/// skipping any index already placed.
pub fn elect_coordinator(
    session_id: &SessionId,
    participants: &[Participant],
    salt: &[u8],
    method: ElectionMethod,
) -> ElectionResult {
    let ElectionMethod::DeterministicHash = method;
    let n = participants.len();
    debug_assert!(n > 0, "election requires at least one participant");

    let mut ranked: Vec<(usize, [u8; 32])> = (0..n)
        .map(|counter| {
            let hash = election_hash(session_id, participants, salt, counter as u8);
            (hash_to_index(&hash, n), hash)
        })
        .collect();

    let mut priority = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    // Primary coordinator: the index derived directly from counter 0.
    let primary = ranked[0].0;
    priority.push(primary);
    seen[primary] = true;

    // Backup ordering: walk subsequent counters' derived indices,
    // falling through to the next unseen index (by hash magnitude) when a
    // counter's index collides with one already placed.
    ranked.sort_by(|a, b| a.1.cmp(&b.1));
    for (_, hash) in ranked {
        let candidate = hash_to_index(&hash, n);
        if !seen[candidate] {
            priority.push(candidate);
            seen[candidate] = true;
            continue;
        }
        if let Some(fallback) = (0..n).find(|&index| !seen[index]) {
            priority.push(fallback);
            seen[fallback] = true;
        }
    }

    ElectionResult { method, priority }
}

/// `verifyElectionResult`: any participant can recompute the same
/// election independently and check a claimed result matches.
pub fn verify_election_result(
    session_id: &SessionId,
    participants: &[Participant],
    salt: &[u8],
    claimed: &ElectionResult,
) -> bool {
    elect_coordinator(session_id, participants, salt, claimed.method) == *claimed
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotus_primitives::{Point, Scalar};

    fn participants(n: u8) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant {
                signer_index: i as usize,
                peer_id: format!("peer-{i}"),
                public_key: Point::from_scalar_mul_generator(
                    &Scalar::from_bytes_nonzero(&[i + 1; 32]).unwrap(),
                ),
            })
            .collect()
    }

    #[test]
    fn election_is_deterministic() {
        let session_id = SessionId([0x09; 32]);
        let parts = participants(4);
        let a = elect_coordinator(&session_id, &parts, b"salt", ElectionMethod::DeterministicHash);
        let b = elect_coordinator(&session_id, &parts, b"salt", ElectionMethod::DeterministicHash);
        assert_eq!(a, b);
    }

    #[test]
    fn priority_list_is_a_permutation() {
        let session_id = SessionId([0x0a; 32]);
        let parts = participants(5);
        let result = elect_coordinator(&session_id, &parts, b"salt", ElectionMethod::DeterministicHash);
        assert_eq!(result.priority.len(), 5);
        let mut sorted = result.priority.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn different_salt_can_change_result() {
        let session_id = SessionId([0x0b; 32]);
        let parts = participants(6);
        let a = elect_coordinator(&session_id, &parts, b"salt-a", ElectionMethod::DeterministicHash);
        let b = elect_coordinator(&session_id, &parts, b"salt-b", ElectionMethod::DeterministicHash);
        // Not asserted unequal (a collision is possible), just that both are valid permutations.
        assert_eq!(a.priority.len(), 6);
        assert_eq!(b.priority.len(), 6);
    }

    #[test]
    fn verification_accepts_honest_claim_and_rejects_tampering() {
        let session_id = SessionId([0x0c; 32]);
        let parts = participants(3);
        let result = elect_coordinator(&session_id, &parts, b"s", ElectionMethod::DeterministicHash);
        assert!(verify_election_result(&session_id, &parts, b"s", &result));

        let mut tampered = result.clone();
        tampered.priority.swap(0, 1);
        if tampered.priority != result.priority {
            assert!(!verify_election_result(&session_id, &parts, b"s", &tampered));
        }
    }

    #[test]
    fn next_after_walks_the_priority_list_and_ends_at_none() {
        let session_id = SessionId([0x0d; 32]);
        let parts = participants(3);
        let result = elect_coordinator(&session_id, &parts, b"s", ElectionMethod::DeterministicHash);
        let last = *result.priority.last().unwrap();
        assert_eq!(result.next_after(last), None);
        let first = result.priority[0];
        assert_eq!(result.next_after(first), Some(result.priority[1]));
    }
}
