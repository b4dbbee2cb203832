//! Finger tables for every id on the ring.
//!
//! Tables are always rebuilt as a complete set from the current health view,
//! never patched in place. Ids that never registered count as offline.

use std::fmt;

use super::types::{NodeId, Ring};

/// One routing entry: the probed id and the first online id at or after it.
///
/// `successor` is `None` when no node on the ring is online.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerEntry {
    pub probe: NodeId,
    pub successor: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerTable {
    entries: Vec<FingerEntry>,
}

impl FingerTable {
    /// Entry 0, whose successor is the owner's immediate online successor.
    pub fn first(&self) -> Option<&FingerEntry> {
        self.entries.first()
    }

    pub fn get(&self, index: usize) -> Option<&FingerEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FingerEntry] {
        &self.entries
    }
}

impl fmt::Display for FingerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|entry| match entry.successor {
                Some(successor) => format!("({}, {})", entry.probe, successor),
                None => format!("({}, -)", entry.probe),
            })
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// For each id, the first online id at or after it (wrapping), in one O(N) sweep.
fn online_successors<F>(ring: &Ring, is_online: F) -> Vec<Option<NodeId>>
where
    F: Fn(NodeId) -> bool,
{
    let n = ring.size() as usize;
    let online: Vec<bool> = ring.ids().map(&is_online).collect();
    let mut successors = vec![None; n];

    // Walking two laps backwards lets wrap-around successors reach the tail.
    let mut next = None;
    for i in (0..2 * n).rev() {
        let idx = i % n;
        if online[idx] {
            next = Some(NodeId(idx as u64));
        }
        if i < n {
            successors[idx] = next;
        }
    }
    successors
}

/// Builds the finger table of every id in `[0, N)`; index `k` holds node `k`'s table.
pub fn build_finger_tables<F>(ring: &Ring, is_online: F) -> Vec<FingerTable>
where
    F: Fn(NodeId) -> bool,
{
    let successors = online_successors(ring, is_online);
    let table_size = ring.table_size();

    ring.ids()
        .map(|k| FingerTable {
            entries: (0..table_size)
                .map(|i| {
                    let probe = ring.probe(k, i);
                    FingerEntry {
                        probe,
                        successor: successors[probe.0 as usize],
                    }
                })
                .collect(),
        })
        .collect()
}
