use std::net::SocketAddr;
use std::time::Duration;

use crate::config::RingConfig;
use crate::error::Result;
use crate::protocol::message::Message;
use crate::protocol::transport::send_message;
use crate::ring::types::NodeId;

/// Fire-and-forget submissions to the coordinator.
///
/// `Ok` means the line reached the coordinator's socket, not that the key landed
/// anywhere; the protocol has no acknowledgements.
#[derive(Debug, Clone)]
pub struct RingClient {
    coordinator: SocketAddr,
    secret: String,
    connect_timeout: Duration,
}

impl RingClient {
    pub fn new(coordinator: SocketAddr, secret: impl Into<String>) -> Self {
        Self {
            coordinator,
            secret: secret.into(),
            connect_timeout: RingConfig::default().probe_timeout(),
        }
    }

    pub fn from_config(config: &RingConfig) -> Self {
        Self::new(config.coordinator_addr, config.secret.clone())
            .with_connect_timeout(config.probe_timeout())
    }

    pub fn with_connect_timeout(mut self, limit: Duration) -> Self {
        self.connect_timeout = limit;
        self
    }

    pub fn coordinator(&self) -> SocketAddr {
        self.coordinator
    }

    pub async fn send(&self, message: &Message) -> Result<()> {
        send_message(self.coordinator, message, &self.secret, self.connect_timeout).await
    }

    /// Asks the coordinator to place `key`. `force` skips its liveness re-check.
    pub async fn store(&self, key: u64, force: bool) -> Result<()> {
        self.send(&Message::Store { key, force }).await
    }

    pub async fn take_offline(&self, node_id: NodeId) -> Result<()> {
        self.send(&Message::OffRequest { node_id }).await
    }
}
