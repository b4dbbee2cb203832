use crate::error::{Error, Result};
use crate::membership::registry::MembershipRegistry;
use crate::ring::types::NodeId;

/// Stores are only routed once every id has registered.
pub fn ensure_ready(registry: &MembershipRegistry) -> Result<()> {
    if registry.is_full() {
        Ok(())
    } else {
        Err(Error::RingNotReady {
            registered: registry.registered_count(),
            size: registry.ring().size(),
        })
    }
}

/// Destination for `key`: its owner when online, otherwise entry 0 of the owner's
/// finger table, which holds the owner's immediate online successor.
pub fn route(registry: &MembershipRegistry, key: u64) -> Result<NodeId> {
    let owner = registry.ring().owner_of(key);
    if registry.is_online(owner) {
        return Ok(owner);
    }

    registry
        .finger_table(owner)
        .and_then(|table| table.first())
        .and_then(|entry| entry.successor)
        .ok_or(Error::NoOnlineSuccessor(owner))
}
