//! Wire Protocol
//!
//! Newline-terminated text over a fresh TCP connection per message. Every line starts
//! with the deployment's shared secret; lines that fail the check are dropped without
//! a reply, exactly like malformed ones. There is no error-response message.

pub mod message;
pub mod transport;

#[cfg(test)]
mod tests;
