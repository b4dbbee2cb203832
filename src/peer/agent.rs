use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::identity;
use super::store::LocalStore;
use super::types::PeerState;
use crate::client::RingClient;
use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::protocol::message::Message;
use crate::protocol::transport::read_line;
use crate::ring::types::NodeId;

/// State shared between the agent handle and its listener task.
pub(super) struct PeerInner {
    pub(super) config: RingConfig,
    pub(super) client: RingClient,
    pub(super) port: u16,
    pub(super) node_id: RwLock<Option<NodeId>>,
    pub(super) state: RwLock<PeerState>,
    pub(super) store: LocalStore,
    /// Completed by the first `id` reply while registration is pending.
    pub(super) registration: Mutex<Option<oneshot::Sender<NodeId>>>,
}

/// A running ring member: one listener, one local key set.
pub struct PeerAgent {
    inner: Arc<PeerInner>,
    cancel: CancellationToken,
    listener_task: Option<JoinHandle<()>>,
}

impl PeerAgent {
    /// Brings the node up.
    ///
    /// Without an identity file the node registers and waits, bounded by the
    /// registration timeout, for its id. With one it rebinds the persisted port
    /// and announces itself `online`.
    pub async fn start(config: RingConfig) -> Result<Self> {
        config.validate()?;
        let persisted = identity::load(&config.id_file).await?;

        let bind_port = persisted.map(|identity| identity.port).unwrap_or(0);
        let listener = TcpListener::bind((config.listen_host, bind_port)).await?;
        let port = listener.local_addr()?.port();

        let (tx, reply) = oneshot::channel();
        let (state, registration) = match persisted {
            Some(_) => (PeerState::Active, None),
            None => (PeerState::Unregistered, Some(tx)),
        };

        let inner = Arc::new(PeerInner {
            client: RingClient::from_config(&config),
            config,
            port,
            node_id: RwLock::new(persisted.map(|identity| identity.node_id)),
            state: RwLock::new(state),
            store: LocalStore::new(),
            registration: Mutex::new(registration),
        });

        let cancel = CancellationToken::new();
        let listener_task = {
            let inner = inner.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                inner.listen(listener, cancel).await;
            })
        };

        let mut agent = Self {
            inner,
            cancel,
            listener_task: Some(listener_task),
        };

        let announced = match persisted {
            Some(identity) => agent.announce_online(identity.node_id).await,
            None => agent.register(reply).await,
        };

        if let Err(e) = announced {
            agent.shutdown();
            agent.wait().await;
            return Err(e);
        }
        Ok(agent)
    }

    async fn announce_online(&self, node_id: NodeId) -> Result<()> {
        info!("Node {} back on port {}, announcing", node_id, self.inner.port);
        self.inner
            .client
            .send(&Message::Online {
                node_id,
                port: self.inner.port,
            })
            .await
    }

    async fn register(&self, reply: oneshot::Receiver<NodeId>) -> Result<()> {
        info!(
            "Registering with coordinator {} from port {}",
            self.inner.client.coordinator(),
            self.inner.port
        );
        *self.inner.state.write().await = PeerState::AwaitingId;
        self.inner
            .client
            .send(&Message::Register {
                port: self.inner.port,
            })
            .await?;

        let limit = self.inner.config.registration_timeout();
        match timeout(limit, reply).await {
            Ok(Ok(node_id)) => {
                info!("Joined the ring as node {}", node_id);
                Ok(())
            }
            Ok(Err(_)) => Err(Error::RegistrationAborted),
            Err(_) => Err(Error::RegistrationTimeout(limit)),
        }
    }

    pub async fn node_id(&self) -> Option<NodeId> {
        *self.inner.node_id.read().await
    }

    pub fn port(&self) -> u16 {
        self.inner.port
    }

    pub async fn state(&self) -> PeerState {
        *self.inner.state.read().await
    }

    pub fn store(&self) -> &LocalStore {
        &self.inner.store
    }

    /// Stops the listener without migrating anything.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the listener is gone, after `off` or [`PeerAgent::shutdown`].
    pub async fn wait(&mut self) {
        if let Some(task) = self.listener_task.take() {
            if let Err(e) = task.await {
                tracing::error!("Listener task of port {} failed: {}", self.inner.port, e);
            }
        }
    }
}

impl Drop for PeerAgent {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl PeerInner {
    /// Serves one connection at a time until cancelled or told `off`.
    async fn listen(self: Arc<Self>, listener: TcpListener, cancel: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, from)) => {
                    if self.handle_connection(stream, from).await.is_break() {
                        cancel.cancel();
                        break;
                    }
                }
                Err(e) => tracing::error!("Failed to accept connection: {}", e),
            }
        }
        info!("Listener on port {} closed", self.port);
    }

    async fn handle_connection(&self, mut stream: TcpStream, from: SocketAddr) -> ControlFlow<()> {
        let line = match timeout(self.config.probe_timeout(), read_line(&mut stream)).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => return ControlFlow::Continue(()),
            Ok(Err(e)) => {
                tracing::warn!("Failed to read from {}: {}", from, e);
                return ControlFlow::Continue(());
            }
            Err(_) => {
                tracing::debug!("Connection from {} sent nothing in time", from);
                return ControlFlow::Continue(());
            }
        };
        drop(stream);

        match Message::decode(&line, &self.config.secret) {
            Ok(message) => self.dispatch(message).await,
            Err(Error::Unauthenticated) => {
                tracing::debug!("Dropping unauthenticated message from {}", from);
                ControlFlow::Continue(())
            }
            Err(e) => {
                tracing::warn!("Dropping malformed message from {}: {}", from, e);
                ControlFlow::Continue(())
            }
        }
    }
}
