//! Membership Module Tests
//!
//! ## Test Scopes
//! - **Registration**: id uniqueness, capacity limit, record contents.
//! - **Re-announcement**: address updates and adoption of unknown ids.
//! - **Health & tables**: change detection and finger-table completeness after rebuilds.

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::membership::registry::MembershipRegistry;
    use crate::membership::types::Health;
    use crate::ring::finger::FingerTable;
    use crate::ring::types::{NodeId, Ring};
    use std::collections::HashSet;
    use std::net::{IpAddr, SocketAddr};

    fn localhost() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    fn all_tables(registry: &MembershipRegistry) -> Vec<&FingerTable> {
        registry
            .ring()
            .ids()
            .filter_map(|id| registry.finger_table(id))
            .collect()
    }

    fn full_registry(size: u64) -> MembershipRegistry {
        let mut registry = MembershipRegistry::new(Ring::new(size).unwrap());
        for port in 0..size as u16 {
            registry.register(localhost(), 7000 + port).unwrap();
        }
        registry.rebuild_finger_tables();
        registry
    }

    // ============================================================
    // REGISTRATION
    // ============================================================

    #[test]
    fn test_fresh_registry_has_tables_but_no_members() {
        let registry = MembershipRegistry::new(Ring::new(4).unwrap());

        assert_eq!(registry.registered_count(), 0);
        assert!(!registry.is_full());
        assert_eq!(all_tables(&registry).len(), 4);
        assert!(registry.finger_table(NodeId(4)).is_none());
        assert!(registry.members().is_empty());
        assert!(!registry.is_online(NodeId(0)));
    }

    #[test]
    fn test_register_records_online_node_at_hashed_id() {
        let mut registry = MembershipRegistry::new(Ring::new(4).unwrap());

        // sha1("127.0.0.15001") mod 4 == 2
        let id = registry.register(localhost(), 5001).unwrap();
        assert_eq!(id, NodeId(2));
        assert_eq!(registry.health_of(id), Some(Health::Online));
        assert_eq!(
            registry.address_of(id),
            Some("127.0.0.1:5001".parse::<SocketAddr>().unwrap())
        );
        assert_eq!(registry.registered_count(), 1);
    }

    #[test]
    fn test_register_same_hash_twice_probes_forward() {
        let mut registry = MembershipRegistry::new(Ring::new(4).unwrap());

        let first = registry.register(localhost(), 5001).unwrap();
        let second = registry.register(localhost(), 5001).unwrap();
        assert_eq!(first, NodeId(2));
        assert_eq!(second, NodeId(3));
    }

    #[test]
    fn test_ids_unique_and_ring_rejects_extra_nodes() {
        let mut registry = MembershipRegistry::new(Ring::new(4).unwrap());
        let mut seen = HashSet::new();

        for port in 5001..5005 {
            let id = registry.register(localhost(), port).unwrap();
            assert!(seen.insert(id));
        }
        assert!(registry.is_full());

        let extra = registry.register(localhost(), 5005);
        assert!(matches!(extra, Err(Error::RingFull(4))));
        assert_eq!(registry.registered_count(), 4);
    }

    // ============================================================
    // RE-ANNOUNCEMENT
    // ============================================================

    #[test]
    fn test_report_online_updates_address_and_health() {
        let mut registry = full_registry(4);
        registry.set_health(NodeId(1), Health::Offline);

        let new_addr: SocketAddr = "10.1.1.1:9100".parse().unwrap();
        registry.report_online(NodeId(1), new_addr).unwrap();

        assert_eq!(registry.address_of(NodeId(1)), Some(new_addr));
        assert_eq!(registry.health_of(NodeId(1)), Some(Health::Online));
        assert_eq!(registry.registered_count(), 4);
    }

    #[test]
    fn test_report_online_adopts_unknown_id() {
        let mut registry = MembershipRegistry::new(Ring::new(4).unwrap());
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();

        registry.report_online(NodeId(3), addr).unwrap();
        assert_eq!(registry.registered_count(), 1);
        assert!(registry.is_online(NodeId(3)));

        let out_of_range = registry.report_online(NodeId(4), addr);
        assert!(matches!(out_of_range, Err(Error::NodeOutOfRange(4))));
    }

    // ============================================================
    // HEALTH & FINGER TABLES
    // ============================================================

    #[test]
    fn test_set_health_reports_changes_only() {
        let mut registry = full_registry(4);

        assert!(!registry.set_health(NodeId(0), Health::Online));
        assert!(registry.set_health(NodeId(0), Health::Offline));
        assert!(!registry.set_health(NodeId(0), Health::Offline));
        // unregistered ids never change
        let mut empty = MembershipRegistry::new(Ring::new(4).unwrap());
        assert!(!empty.set_health(NodeId(0), Health::Offline));
    }

    #[test]
    fn test_rebuild_routes_around_offline_node() {
        let mut registry = full_registry(4);
        registry.set_health(NodeId(2), Health::Offline);
        registry.rebuild_finger_tables();

        for table in all_tables(&registry) {
            assert_eq!(table.len(), 2);
            for entry in table.entries() {
                let successor = entry.successor.unwrap();
                assert!(registry.is_online(successor));
            }
        }
        let table1 = registry.finger_table(NodeId(1)).unwrap();
        assert_eq!(table1.first().unwrap().successor, Some(NodeId(3)));
    }

    #[test]
    fn test_rebuild_with_everyone_offline_uses_sentinel() {
        let mut registry = full_registry(4);
        for id in 0..4 {
            registry.set_health(NodeId(id), Health::Offline);
        }
        registry.rebuild_finger_tables();

        assert!(
            all_tables(&registry)
                .iter()
                .all(|table| table.entries().iter().all(|e| e.successor.is_none()))
        );
    }

    #[test]
    fn test_departed_until_reannounced() {
        let mut registry = full_registry(4);

        assert!(registry.mark_departed(NodeId(1)));
        assert!(registry.is_departed(NodeId(1)));
        assert_eq!(registry.health_of(NodeId(1)), Some(Health::Offline));
        assert!(!registry.mark_departed(NodeId(1)));

        let addr: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        registry.report_online(NodeId(1), addr).unwrap();
        assert!(!registry.is_departed(NodeId(1)));
        assert!(registry.is_online(NodeId(1)));
    }
}
