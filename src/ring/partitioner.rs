//! Address hashing and node-id assignment.
//!
//! A registering node is placed at `SHA-1(ip ++ port) mod N`. When that slot is
//! taken the candidate moves forward one id at a time, wrapping, until a free
//! slot turns up. Placement is never revisited once assigned.

use num_bigint::BigUint;
use sha1::{Digest, Sha1};
use std::net::IpAddr;

use super::types::{NodeId, Ring};

/// Candidate id for a node listening on `ip:port`, before collision handling.
pub fn hash_address(ring: &Ring, ip: &IpAddr, port: u16) -> NodeId {
    let text = format!("{}{}", ip, port);
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let value = BigUint::from_bytes_be(&digest) % BigUint::from(ring.size());
    NodeId(value.to_u64_digits().first().copied().unwrap_or(0))
}

/// Picks the id for a new node, probing forward past ids for which `is_taken` holds.
///
/// Returns `None` when every id on the ring is taken.
pub fn assign_id<F>(ring: &Ring, ip: &IpAddr, port: u16, is_taken: F) -> Option<NodeId>
where
    F: Fn(NodeId) -> bool,
{
    let candidate = hash_address(ring, ip, port);
    std::iter::once(candidate)
        .chain(ring.walk_from(candidate))
        .find(|id| !is_taken(*id))
}
