//! Line format: `<secret> <verb> [args...]`, whitespace separated, one message per connection.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::ring::types::NodeId;

pub const VERB_REGISTER: &str = "register";
pub const VERB_ID: &str = "id";
pub const VERB_ONLINE: &str = "online";
pub const VERB_STORE: &str = "store";
pub const VERB_REHASH: &str = "rehash";
pub const VERB_OFF: &str = "off";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Peer -> coordinator: place me; my address is the connection's source IP plus `port`.
    Register { port: u16 },
    /// Coordinator -> peer: your ring id.
    Id { node_id: NodeId },
    /// Peer -> coordinator: I restarted, same id, listening on `port`.
    Online { node_id: NodeId, port: u16 },
    /// Client/peer -> coordinator: route `key`. Coordinator -> peer: keep `key`.
    ///
    /// `force` skips the coordinator's health re-check; set on offline migration.
    Store { key: u64, force: bool },
    /// Coordinator -> peer: hand back every key owned by `target`.
    Rehash { target: NodeId },
    /// Client -> coordinator: take `node_id` out of the ring.
    OffRequest { node_id: NodeId },
    /// Coordinator -> peer: migrate everything and stop.
    Off,
}

impl Message {
    pub fn verb(&self) -> &'static str {
        match self {
            Message::Register { .. } => VERB_REGISTER,
            Message::Id { .. } => VERB_ID,
            Message::Online { .. } => VERB_ONLINE,
            Message::Store { .. } => VERB_STORE,
            Message::Rehash { .. } => VERB_REHASH,
            Message::OffRequest { .. } | Message::Off => VERB_OFF,
        }
    }

    /// Renders the message with the shared secret, without a trailing newline.
    pub fn encode(&self, secret: &str) -> String {
        format!("{} {}", secret, self)
    }

    /// Parses one line, checking the shared secret first.
    pub fn decode(line: &str, secret: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let token = tokens.next().ok_or(Error::EmptyMessage)?;
        if token != secret {
            return Err(Error::Unauthenticated);
        }
        let verb = tokens.next().ok_or(Error::EmptyMessage)?;
        let args: Vec<&str> = tokens.collect();

        match verb {
            VERB_REGISTER => {
                let [port] = expect_args::<1>(VERB_REGISTER, "1", &args)?;
                Ok(Message::Register {
                    port: parse_number(port)?,
                })
            }
            VERB_ID => {
                let [node_id] = expect_args::<1>(VERB_ID, "1", &args)?;
                Ok(Message::Id {
                    node_id: NodeId(parse_number(node_id)?),
                })
            }
            VERB_ONLINE => {
                let [node_id, port] = expect_args::<2>(VERB_ONLINE, "2", &args)?;
                Ok(Message::Online {
                    node_id: NodeId(parse_number(node_id)?),
                    port: parse_number(port)?,
                })
            }
            VERB_STORE => {
                let [key, force] = expect_args::<2>(VERB_STORE, "2", &args)?;
                Ok(Message::Store {
                    key: parse_number(key)?,
                    force: parse_flag(force)?,
                })
            }
            VERB_REHASH => {
                let [target] = expect_args::<1>(VERB_REHASH, "1", &args)?;
                Ok(Message::Rehash {
                    target: NodeId(parse_number(target)?),
                })
            }
            VERB_OFF => match args.as_slice() {
                [] => Ok(Message::Off),
                [node_id] => Ok(Message::OffRequest {
                    node_id: NodeId(parse_number(node_id)?),
                }),
                _ => Err(Error::ArgumentCount {
                    verb: VERB_OFF,
                    expected: "0 or 1",
                    got: args.len(),
                }),
            },
            other => Err(Error::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Message::Register { port } => write!(f, "{verb} {port}"),
            Message::Id { node_id } => write!(f, "{verb} {node_id}"),
            Message::Online { node_id, port } => write!(f, "{verb} {node_id} {port}"),
            Message::Store { key, force } => write!(f, "{verb} {key} {force}"),
            Message::Rehash { target } => write!(f, "{verb} {target}"),
            Message::OffRequest { node_id } => write!(f, "{verb} {node_id}"),
            Message::Off => write!(f, "{verb}"),
        }
    }
}

fn expect_args<'a, const N: usize>(
    verb: &'static str,
    expected: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| Error::ArgumentCount {
        verb,
        expected,
        got: args.len(),
    })
}

fn parse_number<T: FromStr>(token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::InvalidNumber(token.to_string()))
}

fn parse_flag(token: &str) -> Result<bool> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::InvalidFlag(other.to_string())),
    }
}
