//! Error types shared by the ring model, the wire protocol, the coordinator and the peers.
use std::time::Duration;

use crate::ring::types::NodeId;

/// A wrap `Result` over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Ring size must be between 1 and {max}, got {0}", max = crate::ring::types::MAX_RING_SIZE)]
    InvalidRingSize(u64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty message")]
    EmptyMessage,
    #[error("Message failed shared-secret check")]
    Unauthenticated,
    #[error("Unknown verb: {0}")]
    UnknownVerb(String),
    #[error("Verb `{verb}` expects {expected} argument(s), got {got}")]
    ArgumentCount {
        verb: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("Not a non-negative integer: {0}")]
    InvalidNumber(String),
    #[error("Not a boolean flag: {0}")]
    InvalidFlag(String),

    #[error("Ring is full ({0} nodes registered)")]
    RingFull(u64),
    #[error("Ring not ready: {registered} of {size} nodes registered")]
    RingNotReady { registered: u64, size: u64 },
    #[error("Node id {0} is outside the ring")]
    NodeOutOfRange(u64),
    #[error("No online node can take over for {0}")]
    NoOnlineSuccessor(NodeId),
    #[error("Node {0} has never registered")]
    UnknownNode(NodeId),

    #[error("No id assignment received within {0:?}")]
    RegistrationTimeout(Duration),
    #[error("Listener stopped before registration completed")]
    RegistrationAborted,
    #[error("Corrupt identity file: {0}")]
    CorruptIdentity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
