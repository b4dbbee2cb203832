use std::net::{IpAddr, SocketAddr};

use tracing::info;

use super::router::{ensure_ready, route};
use super::service::CoordinatorService;
use crate::error::{Error, Result};
use crate::protocol::message::Message;
use crate::ring::types::NodeId;

impl CoordinatorService {
    /// Serves one decoded request. `from` is the source address of the connection.
    pub(super) async fn dispatch(&self, message: Message, from: SocketAddr) -> Result<()> {
        match message {
            Message::Register { port } => self.register(from.ip(), port).await.map(|_| ()),
            Message::Online { node_id, port } => {
                self.report_online(node_id, SocketAddr::new(from.ip(), port))
                    .await
            }
            Message::Store { key, force } => self.route_store(key, force).await.map(|_| ()),
            Message::OffRequest { node_id } => self.mark_offline(node_id.0).await,
            Message::Id { .. } | Message::Rehash { .. } | Message::Off => {
                tracing::debug!("Ignoring peer-bound `{}` from {}", message, from);
                Ok(())
            }
        }
    }

    /// Assigns an id to the node at `ip:port` and tells it which one.
    pub async fn register(&self, ip: IpAddr, port: u16) -> Result<NodeId> {
        let (id, addr) = {
            let mut registry = self.registry.lock().await;
            let id = registry.register(ip, port)?;
            registry.rebuild_finger_tables();
            info!(
                "Registered node {} at {}:{} ({}/{})",
                id,
                ip,
                port,
                registry.registered_count(),
                registry.ring().size()
            );
            (id, SocketAddr::new(ip, port))
        };

        // The node keeps its slot even if the reply never arrives.
        let _ = self.send_to(id, addr, Message::Id { node_id: id }).await;
        self.check_health().await;
        Ok(id)
    }

    /// A restarted node is back on `addr`; once the ring is complete its successor
    /// is asked to hand back the keys the node owns.
    pub async fn report_online(&self, id: NodeId, addr: SocketAddr) -> Result<()> {
        let ready = {
            let mut registry = self.registry.lock().await;
            registry.report_online(id, addr)?;
            registry.rebuild_finger_tables();
            info!("Node {} back online at {}", id, addr);
            registry.is_full()
        };

        if ready {
            match self.next_online_successor(id).await {
                Some(successor) => {
                    info!("Asking node {} to rehash keys of node {}", successor, id);
                    let _ = self
                        .send_command(successor, Message::Rehash { target: id })
                        .await;
                }
                None => tracing::warn!("No online successor to rehash for node {}", id),
            }
        }

        self.check_health().await;
        Ok(())
    }

    /// Forwards `key` to the node that should hold it. Returns that node.
    ///
    /// Unless `force` is set, liveness is re-checked first so a silently dead
    /// owner gets routed around.
    pub async fn route_store(&self, key: u64, force: bool) -> Result<NodeId> {
        let (target, addr) = {
            let mut registry = self.registry.lock().await;
            ensure_ready(&registry)?;
            if !force {
                self.refresh_health(&mut registry).await;
            }
            let target = route(&registry, key)?;
            let addr = registry
                .address_of(target)
                .ok_or(Error::UnknownNode(target))?;
            (target, addr)
        };

        info!("Storing key {} on node {}", key, target);
        self.send_to(target, addr, Message::Store { key, force })
            .await?;
        Ok(target)
    }

    /// Takes `raw` out of the ring and tells it to migrate its keys and stop.
    pub async fn mark_offline(&self, raw: u64) -> Result<()> {
        {
            let mut registry = self.registry.lock().await;
            ensure_ready(&registry)?;
            let id = registry.ring().node(raw)?;
            registry.mark_departed(id);
            registry.rebuild_finger_tables();
            info!("Node {} marked offline", id);
        }

        self.send_command(NodeId(raw), Message::Off).await
    }
}
