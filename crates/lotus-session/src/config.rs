//! `SessionConfig` (§6's configuration table): a single struct carrying
//! every tunable, with a `Default` impl supplying the documented defaults.

/// How DHT-derived peer info is filtered before it leaves the process.
/// §6: `passthrough` is the default for localhost deployments,
/// `remove-private` elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DhtPeerInfoMapper {
    Passthrough,
    RemovePrivate,
}

/// Every configuration row of §6, with the documented defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Threshold used by [`crate::coordinator::SessionCoordinator::cleanup_expired_sessions`].
    /// Default 10 minutes (§4.6.6).
    pub stuck_session_timeout_ms: u64,
    /// If `false`, the coordinator is always the session creator instead of
    /// running §4.6.2's `DeterministicHash` election.
    pub enable_coordinator_election: bool,
    /// Gates `trigger_coordinator_failover`; when `false` that call is
    /// rejected outright.
    pub enable_coordinator_failover: bool,
    /// Reject inbound messages larger than this (§4.6.4).
    pub max_message_size_bytes: usize,
    pub dht_peer_info_mapper: DhtPeerInfoMapper,
    pub min_connections: usize,
    pub max_connections: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stuck_session_timeout_ms: 10 * 60 * 1000,
            enable_coordinator_election: true,
            enable_coordinator_failover: true,
            max_message_size_bytes: 64 * 1024,
            dht_peer_info_mapper: DhtPeerInfoMapper::RemovePrivate,
            min_connections: 1,
            max_connections: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SessionConfig::default();
        assert_eq!(config.stuck_session_timeout_ms, 600_000);
        assert!(config.enable_coordinator_election);
        assert!(config.enable_coordinator_failover);
        assert_eq!(config.max_message_size_bytes, 65_536);
        assert_eq!(config.dht_peer_info_mapper, DhtPeerInfoMapper::RemovePrivate);
    }
}
