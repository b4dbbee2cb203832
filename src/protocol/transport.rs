//! One-shot TCP helpers: every message travels over its own connection.
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::message::Message;
use crate::error::Result;

/// Longest line a receiver will buffer before giving up on the message.
pub const MAX_LINE_BYTES: u64 = 4096;

pub async fn connect_with_timeout(addr: SocketAddr, limit: Duration) -> Result<TcpStream> {
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("connect to {addr} timed out after {limit:?}"),
        )
        .into()),
    }
}

/// Opens a connection to `addr`, writes `message` as one line and closes.
pub async fn send_message(
    addr: SocketAddr,
    message: &Message,
    secret: &str,
    limit: Duration,
) -> Result<()> {
    let mut stream = connect_with_timeout(addr, limit).await?;
    let mut line = message.encode(secret);
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads a single line; `None` when the sender closed without writing anything,
/// which is how liveness probes look from the receiving side.
///
/// A line that runs into [`MAX_LINE_BYTES`] without its newline is rejected whole.
pub async fn read_line<R>(stream: R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream.take(MAX_LINE_BYTES));
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    if read as u64 >= MAX_LINE_BYTES && !line.ends_with('\n') {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("line exceeds {MAX_LINE_BYTES} bytes"),
        )
        .into());
    }
    Ok(Some(line.trim_end().to_string()))
}

/// Fail-closed reachability check: any connect error or timeout counts as down.
pub async fn probe(addr: SocketAddr, limit: Duration) -> bool {
    match connect_with_timeout(addr, limit).await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", addr, e);
            false
        }
    }
}
