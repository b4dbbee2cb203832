use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::membership::registry::MembershipRegistry;
use crate::membership::types::Health;
use crate::protocol::message::Message;
use crate::protocol::transport::{probe, read_line, send_message};
use crate::ring::finger::FingerTable;
use crate::ring::types::{NodeId, Ring};

/// The rendezvous service every peer and client talks to.
///
/// All membership, health and finger-table state lives in one registry behind one
/// lock. Each inbound connection gets its own task; replies and commands to peers
/// always go out over a fresh connection.
pub struct CoordinatorService {
    pub(super) config: RingConfig,
    pub(super) registry: Mutex<MembershipRegistry>,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl CoordinatorService {
    /// Binds the coordinator's listening socket at `config.coordinator_addr`.
    pub async fn bind(config: RingConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let ring = Ring::new(config.ring_size)?;
        let listener = TcpListener::bind(config.coordinator_addr).await?;
        let local_addr = listener.local_addr()?;

        info!(
            "Coordinator listening on {} (ring size {}, finger table size {})",
            local_addr,
            ring.size(),
            ring.table_size()
        );

        Ok(Arc::new(Self {
            config,
            registry: Mutex::new(MembershipRegistry::new(ring)),
            listener,
            local_addr,
        }))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until `cancel` fires.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    let service = self.clone();
                    tokio::spawn(async move {
                        service.handle_connection(stream, peer).await;
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
        info!("Coordinator on {} stopped", self.local_addr);
    }

    pub(super) async fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        let line = match timeout(self.config.probe_timeout(), read_line(&mut stream)).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                tracing::debug!("Empty connection from {}", peer);
                return;
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to read from {}: {}", peer, e);
                return;
            }
            Err(_) => {
                tracing::debug!("Connection from {} sent nothing in time", peer);
                return;
            }
        };
        drop(stream);

        let message = match Message::decode(&line, &self.config.secret) {
            Ok(message) => message,
            Err(Error::Unauthenticated) => {
                tracing::debug!("Dropping unauthenticated message from {}", peer);
                return;
            }
            Err(e) => {
                tracing::warn!("Dropping malformed message from {}: {}", peer, e);
                return;
            }
        };

        tracing::debug!("Message from {}: {}", peer, message);
        if let Err(e) = self.dispatch(message, peer).await {
            tracing::warn!("Request `{}` from {} not served: {}", message, peer, e);
        }
    }

    // ============================================================
    // STATE INSPECTION
    // ============================================================

    pub async fn registered_count(&self) -> u64 {
        self.registry.lock().await.registered_count()
    }

    pub async fn is_ready(&self) -> bool {
        self.registry.lock().await.is_full()
    }

    pub async fn health_of(&self, id: NodeId) -> Option<Health> {
        self.registry.lock().await.health_of(id)
    }

    pub async fn finger_table(&self, id: NodeId) -> Option<FingerTable> {
        self.registry.lock().await.finger_table(id).cloned()
    }

    // ============================================================
    // HEALTH
    // ============================================================

    /// Probes every registered node and rebuilds finger tables if anything flipped.
    ///
    /// Returns whether any record changed.
    pub async fn check_health(&self) -> bool {
        let mut registry = self.registry.lock().await;
        self.refresh_health(&mut registry).await
    }

    /// Health pass over an already-locked registry.
    pub(super) async fn refresh_health(&self, registry: &mut MembershipRegistry) -> bool {
        tracing::debug!("Checking status of {} nodes", registry.registered_count());
        let mut changed = false;

        for member in registry.members() {
            if registry.is_departed(member.id) {
                continue;
            }
            let reachable = probe(member.addr, self.config.probe_timeout()).await;
            if registry.set_health(member.id, Health::from_reachable(reachable)) {
                info!("Node {} status: {:?}", member.id, Health::from_reachable(reachable));
                changed = true;
            }
        }

        if changed {
            info!("Updating finger tables");
            registry.rebuild_finger_tables();
        }
        changed
    }

    /// First id after `id` that is recorded online and answers a probe right now.
    pub(super) async fn next_online_successor(&self, id: NodeId) -> Option<NodeId> {
        let registry = self.registry.lock().await;
        for candidate in registry.ring().walk_from(id) {
            if !registry.is_online(candidate) {
                continue;
            }
            let Some(addr) = registry.address_of(candidate) else {
                continue;
            };
            if probe(addr, self.config.probe_timeout()).await {
                return Some(candidate);
            }
        }
        None
    }

    // ============================================================
    // OUTBOUND
    // ============================================================

    /// Sends `message` to the node's recorded address over a new connection.
    ///
    /// State changes that led here are never rolled back when the send fails.
    pub(super) async fn send_command(&self, id: NodeId, message: Message) -> Result<()> {
        let addr = self
            .registry
            .lock()
            .await
            .address_of(id)
            .ok_or(Error::UnknownNode(id))?;

        self.send_to(id, addr, message).await
    }

    pub(super) async fn send_to(&self, id: NodeId, addr: SocketAddr, message: Message) -> Result<()> {
        match send_message(addr, &message, &self.config.secret, self.config.probe_timeout()).await {
            Ok(()) => {
                tracing::debug!("Sent `{}` to node {} at {}", message, id, addr);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Node {} at {} unreachable, `{}` not delivered: {}", id, addr, message, e);
                Err(e)
            }
        }
    }
}
