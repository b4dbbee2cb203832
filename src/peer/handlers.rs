use std::ops::ControlFlow;

use tracing::info;

use super::agent::PeerInner;
use super::identity;
use super::types::{Identity, PeerState};
use crate::protocol::message::Message;
use crate::ring::types::NodeId;

impl PeerInner {
    /// Applies one message. `Break` ends the listener.
    pub(super) async fn dispatch(&self, message: Message) -> ControlFlow<()> {
        match message {
            Message::Id { node_id } => self.handle_id(node_id).await,
            Message::Store { key, .. } => self.handle_store(key).await,
            Message::Rehash { target } => self.handle_rehash(target).await,
            Message::Off => {
                self.handle_off().await;
                return ControlFlow::Break(());
            }
            Message::Register { .. } | Message::Online { .. } | Message::OffRequest { .. } => {
                tracing::debug!("Ignoring coordinator-bound `{}`", message);
            }
        }
        ControlFlow::Continue(())
    }

    async fn handle_id(&self, node_id: NodeId) {
        let identity = Identity {
            node_id,
            port: self.port,
        };
        if let Err(e) = identity::save(&self.config.id_file, &identity).await {
            tracing::error!(
                "Failed to persist id {} to {}: {}",
                node_id,
                self.config.id_file.display(),
                e
            );
        }
        *self.node_id.write().await = Some(node_id);

        let pending = self.registration.lock().await.take();
        match pending {
            Some(reply) => {
                *self.state.write().await = PeerState::Active;
                let _ = reply.send(node_id);
            }
            None => info!("Coordinator repeated id {}; persisted, nothing else to do", node_id),
        }
    }

    async fn handle_store(&self, key: u64) {
        let state = *self.state.read().await;
        if !state.is_active() {
            tracing::warn!("Dropping key {} received while {}", key, state);
            return;
        }
        if self.store.insert(key) {
            info!("Stored key {}", key);
        } else {
            tracing::debug!("Key {} already held", key);
        }
    }

    /// Hands every key owned by `target` back to the coordinator for re-placement.
    async fn handle_rehash(&self, target: NodeId) {
        let keys = self.store.keys_owned_by(target, self.config.ring_size);
        if keys.is_empty() {
            tracing::debug!("Nothing to rehash for node {}", target);
            return;
        }

        let mut moved = 0;
        for key in keys {
            match self.client.store(key, false).await {
                Ok(()) => {
                    self.store.remove(key);
                    moved += 1;
                }
                Err(e) => tracing::warn!("Keeping key {}, resubmission failed: {}", key, e),
            }
        }
        info!("Rehashed {} keys towards node {}", moved, target);
    }

    /// Empties the store and resubmits every key with `force` set.
    async fn handle_off(&self) {
        let keys = self.store.drain_all();
        info!("Going offline, migrating {} keys", keys.len());

        for key in keys {
            if let Err(e) = self.client.store(key, true).await {
                tracing::warn!("Key {} lost during migration: {}", key, e);
            }
        }
        *self.state.write().await = PeerState::ShuttingDown;
    }
}
