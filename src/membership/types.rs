use std::net::SocketAddr;

use crate::ring::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Online,
    Offline,
}

impl Health {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Health::Online
        } else {
            Health::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Health::Online
    }
}

/// What the coordinator knows about one registered node.
///
/// Records are created on first registration and never removed; the address
/// moves when a node re-announces itself after a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub addr: SocketAddr,
    pub health: Health,
}
