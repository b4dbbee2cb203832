use std::fmt;

/// Where a peer is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// No identity file yet.
    Unregistered,
    /// `register` sent, waiting for the coordinator's `id`.
    AwaitingId,
    /// Holds an id and serves `store`, `rehash` and `off`.
    Active,
    /// Handed its keys back after `off`; the listener is gone.
    ShuttingDown,
}

impl PeerState {
    pub fn is_active(self) -> bool {
        self == PeerState::Active
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerState::Unregistered => "unregistered",
            PeerState::AwaitingId => "awaiting-id",
            PeerState::Active => "active",
            PeerState::ShuttingDown => "shutting-down",
        };
        f.write_str(name)
    }
}

/// The persisted pair that lets a node come back at the same place in the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub node_id: crate::ring::types::NodeId,
    pub port: u16,
}
