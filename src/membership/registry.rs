use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};
use crate::ring::finger::{FingerTable, build_finger_tables};
use crate::ring::partitioner::assign_id;
use crate::ring::types::{NodeId, Ring};

use super::types::{Health, NodeRecord};

/// The coordinator's authoritative view of the ring.
///
/// Holds one record per registered id and one finger table per id in `[0, N)`.
/// Not synchronized itself; the coordinator keeps it behind a single lock so
/// readers never observe a half-rebuilt table set.
#[derive(Debug)]
pub struct MembershipRegistry {
    ring: Ring,
    records: BTreeMap<NodeId, NodeRecord>,
    tables: Vec<FingerTable>,
    registered: u64,
    /// Taken offline on request; liveness probes leave these alone until they re-announce.
    departed: BTreeSet<NodeId>,
}

impl MembershipRegistry {
    pub fn new(ring: Ring) -> Self {
        let mut registry = Self {
            ring,
            records: BTreeMap::new(),
            tables: Vec::new(),
            registered: 0,
            departed: BTreeSet::new(),
        };
        registry.rebuild_finger_tables();
        registry
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn registered_count(&self) -> u64 {
        self.registered
    }

    /// Every id of the ring has registered at least once.
    pub fn is_full(&self) -> bool {
        self.registered >= self.ring.size()
    }

    /// Places a new node and records it as online.
    pub fn register(&mut self, ip: IpAddr, port: u16) -> Result<NodeId> {
        if self.is_full() {
            return Err(Error::RingFull(self.registered));
        }
        let id = assign_id(&self.ring, &ip, port, |id| self.records.contains_key(&id))
            .ok_or(Error::RingFull(self.registered))?;

        self.records.insert(
            id,
            NodeRecord {
                id,
                addr: SocketAddr::new(ip, port),
                health: Health::Online,
            },
        );
        self.registered += 1;
        Ok(id)
    }

    /// A known node came back, possibly on a new address.
    ///
    /// An id the registry has never seen (the coordinator itself restarted) is
    /// adopted as a fresh registration.
    pub fn report_online(&mut self, id: NodeId, addr: SocketAddr) -> Result<()> {
        let id = self.ring.node(id.0)?;
        self.departed.remove(&id);
        match self.records.get_mut(&id) {
            Some(record) => {
                record.addr = addr;
                record.health = Health::Online;
            }
            None => {
                self.records.insert(
                    id,
                    NodeRecord {
                        id,
                        addr,
                        health: Health::Online,
                    },
                );
                self.registered += 1;
            }
        }
        Ok(())
    }

    /// Returns whether the recorded health actually changed.
    pub fn set_health(&mut self, id: NodeId, health: Health) -> bool {
        match self.records.get_mut(&id) {
            Some(record) if record.health != health => {
                record.health = health;
                true
            }
            _ => false,
        }
    }

    /// Marks `id` offline because it was asked to leave. Returns whether health changed.
    pub fn mark_departed(&mut self, id: NodeId) -> bool {
        if !self.records.contains_key(&id) {
            return false;
        }
        self.departed.insert(id);
        self.set_health(id, Health::Offline)
    }

    pub fn is_departed(&self, id: NodeId) -> bool {
        self.departed.contains(&id)
    }

    pub fn health_of(&self, id: NodeId) -> Option<Health> {
        self.records.get(&id).map(|record| record.health)
    }

    /// Unregistered ids count as offline.
    pub fn is_online(&self, id: NodeId) -> bool {
        self.health_of(id).is_some_and(Health::is_online)
    }

    pub fn address_of(&self, id: NodeId) -> Option<SocketAddr> {
        self.records.get(&id).map(|record| record.addr)
    }

    pub fn members(&self) -> Vec<NodeRecord> {
        self.records.values().cloned().collect()
    }

    pub fn finger_table(&self, id: NodeId) -> Option<&FingerTable> {
        self.tables.get(id.0 as usize)
    }

    /// Replaces every table with one computed from current health.
    pub fn rebuild_finger_tables(&mut self) {
        let tables = build_finger_tables(&self.ring, |id| self.is_online(id));
        self.tables = tables;

        for (k, table) in self.tables.iter().enumerate() {
            tracing::debug!("Finger table of node {}: {}", k, table);
        }
    }
}
