//! Ring Model
//!
//! The fixed-size identifier space every key and node id lives in.
//!
//! ## Core Concepts
//! - **Ownership**: key `k` belongs to id `k mod N`.
//! - **Placement**: nodes are placed by hashing their address (`partitioner`), with
//!   forward probing on collisions.
//! - **Finger tables**: per-id `(probe, successor)` pairs over the current health view (`finger`).
//!
//! Pure logic, no I/O.

pub mod finger;
pub mod partitioner;
pub mod types;
