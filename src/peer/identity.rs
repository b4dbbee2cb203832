//! Identity file: the node id on the first line, the listen port on the second.

use std::io::ErrorKind;
use std::path::Path;

use super::types::Identity;
use crate::error::{Error, Result};
use crate::ring::types::NodeId;

/// `Ok(None)` when the file does not exist, meaning the node never registered.
pub async fn load(path: &Path) -> Result<Option<Identity>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut lines = text.lines().map(str::trim);
    let node_id = lines
        .next()
        .and_then(|line| line.parse::<u64>().ok())
        .ok_or_else(|| corrupt(path, "first line is not a node id"))?;
    let port = lines
        .next()
        .and_then(|line| line.parse::<u16>().ok())
        .ok_or_else(|| corrupt(path, "second line is not a port"))?;

    Ok(Some(Identity {
        node_id: NodeId(node_id),
        port,
    }))
}

/// Overwrites `path` with `identity`.
pub async fn save(path: &Path, identity: &Identity) -> Result<()> {
    let text = format!("{}\n{}\n", identity.node_id, identity.port);
    tokio::fs::write(path, text).await?;
    Ok(())
}

fn corrupt(path: &Path, reason: &str) -> Error {
    Error::CorruptIdentity(format!("{}: {}", path.display(), reason))
}
