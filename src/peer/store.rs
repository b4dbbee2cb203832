use dashmap::DashSet;

use crate::ring::types::NodeId;

/// Keys held by one peer. Values are never stored, only key membership.
#[derive(Debug, Default)]
pub struct LocalStore {
    keys: DashSet<u64>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the key was already held.
    pub fn insert(&self, key: u64) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&self, key: u64) -> bool {
        self.keys.remove(&key).is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys whose owner in a ring of `ring_size` ids is `target`, ascending.
    pub fn keys_owned_by(&self, target: NodeId, ring_size: u64) -> Vec<u64> {
        let mut keys: Vec<u64> = self
            .keys
            .iter()
            .map(|entry| *entry)
            .filter(|key| key % ring_size == target.0)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Empties the store and returns what it held, ascending.
    pub fn drain_all(&self) -> Vec<u64> {
        let keys = self.snapshot();
        for key in &keys {
            self.keys.remove(key);
        }
        keys
    }

    /// Sorted copy of every held key.
    pub fn snapshot(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self.keys.iter().map(|entry| *entry).collect();
        keys.sort_unstable();
        keys
    }
}
