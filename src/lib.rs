//! Chord Ring Library
//!
//! A small distributed key store: a fixed ring of `N` ids, one central coordinator
//! and up to `N` peers. The coordinator places nodes, tracks their liveness and
//! forwards every key to the node that should hold it; peers keep their keys and
//! hand them back when the ring changes.
//!
//! ## Architecture Modules
//! - **`ring`**: the identifier space. Ownership, address hashing, finger tables.
//! - **`membership`**: the coordinator's node records and per-id finger tables.
//! - **`protocol`**: the `<secret> <verb> [args]` line format and one-shot TCP helpers.
//! - **`coordinator`**: accept loop, routing, health checks and migration triggers.
//! - **`peer`**: the storage node. Lifecycle, local key set, persisted identity.
//! - **`client`**: submits `store` and `off` requests to the coordinator.
//! - **`config`**, **`error`**, **`logging`**: shared deployment settings and plumbing.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod membership;
pub mod peer;
pub mod protocol;
pub mod ring;
