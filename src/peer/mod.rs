//! Peer Agent
//!
//! A storage node of the ring. It holds the keys the coordinator forwards to it
//! and moves them when the ring changes.
//!
//! ## Lifecycle
//! `Unregistered -> AwaitingId -> Active -> ShuttingDown`. A node that already has
//! an identity file starts `Active` and announces itself `online` on its old port.
//!
//! ## Migration
//! - **`rehash <target>`**: keys owned by `target` are resubmitted through the
//!   coordinator and dropped locally once the resubmission went out.
//! - **`off`**: every key is resubmitted with `force` set, the store is emptied and
//!   the listener closes.

pub mod agent;
pub mod handlers;
pub mod identity;
pub mod store;
pub mod types;

pub use agent::PeerAgent;
