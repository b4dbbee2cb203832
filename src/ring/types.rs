use std::fmt;

use crate::error::{Error, Result};

/// A position on the ring, in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Largest supported ring. The coordinator keeps `N` finger tables of `sqrt(N)`
/// entries each in memory.
pub const MAX_RING_SIZE: u64 = 1 << 14;

/// The modulo-N identifier space shared by keys and node ids.
///
/// All id and key arithmetic goes through this type so nothing depends on a
/// compiled-in ring size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    size: u64,
}

impl Ring {
    pub fn new(size: u64) -> Result<Self> {
        if size == 0 || size > MAX_RING_SIZE {
            return Err(Error::InvalidRingSize(size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// The id responsible for `key` when it is online.
    pub fn owner_of(&self, key: u64) -> NodeId {
        NodeId(key % self.size)
    }

    pub fn contains(&self, raw: u64) -> bool {
        raw < self.size
    }

    /// Checks that `raw` names an id on this ring.
    pub fn node(&self, raw: u64) -> Result<NodeId> {
        if self.contains(raw) {
            Ok(NodeId(raw))
        } else {
            Err(Error::NodeOutOfRange(raw))
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.size).map(NodeId)
    }

    /// Ids after `start` in ring order, wrapping, stopping before `start` again.
    pub fn walk_from(&self, start: NodeId) -> impl Iterator<Item = NodeId> + use<> {
        let size = self.size;
        (1..size).map(move |step| NodeId((start.0 + step) % size))
    }

    /// Entries per finger table: `floor(sqrt(N))`, always at least 1.
    ///
    /// Classical Chord uses `log2(N)`. Routing here only ever reads entry 0,
    /// so the size affects table contents, not where keys land.
    pub fn table_size(&self) -> usize {
        self.size.isqrt() as usize
    }

    /// `(2^i + k) mod N`, computed without overflowing for large `i`.
    pub fn probe(&self, k: NodeId, i: usize) -> NodeId {
        let n = self.size as u128;
        let mut offset = 1u128 % n;
        for _ in 0..i {
            offset = (offset * 2) % n;
        }
        NodeId(((offset + k.0 as u128) % n) as u64)
    }
}
