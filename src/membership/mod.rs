//! Membership Registry
//!
//! The coordinator's record of which node sits at which ring id, where it can be
//! reached, and whether it is currently online.
//!
//! ## Core Mechanisms
//! - **Registration**: new nodes are placed by address hash with forward probing; at most N ever register.
//! - **Re-announcement**: a restarted node keeps its id and updates its address.
//! - **Health**: records flip between `Online` and `Offline`; every flip is followed by a full
//!   finger-table rebuild so routing never reads stale successors.

pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;
