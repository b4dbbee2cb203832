//! Coordinator
//!
//! The central rendezvous point of the ring. Assigns ids, tracks liveness,
//! maintains finger tables and forwards every store to the node that should hold it.
//!
//! ## Core Mechanisms
//! - **Accept loop**: one task per inbound connection, one message per connection.
//! - **Routing**: a key goes to its owner, or to the owner's immediate online
//!   successor (entry 0 of its finger table) while the owner is offline.
//! - **Health**: every registration, re-announcement and unforced store probes all
//!   registered nodes; any change triggers a full finger-table rebuild.
//! - **Migration**: a returning node's successor is told to `rehash`; a node taken
//!   offline is told to `off` and hands its keys back through the coordinator.

pub mod handlers;
pub mod router;
pub mod service;

pub use service::CoordinatorService;
