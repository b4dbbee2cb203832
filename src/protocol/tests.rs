//! Protocol Module Tests
//!
//! ## Test Scopes
//! - **Encoding**: exact line layout for each verb, including the bare `off` command.
//! - **Decoding**: shared-secret check, argument counts, numeric and flag parsing.
//! - **Transport**: one line per connection over loopback, the line-length cap, empty connections, probes.

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::protocol::message::Message;
    use crate::protocol::transport::{MAX_LINE_BYTES, probe, read_line, send_message};
    use crate::ring::types::NodeId;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    const SECRET: &str = "firefly";

    // ============================================================
    // ENCODING
    // ============================================================

    #[test]
    fn test_encode_lines() {
        assert_eq!(
            Message::Register { port: 5001 }.encode(SECRET),
            "firefly register 5001"
        );
        assert_eq!(
            Message::Online {
                node_id: NodeId(3),
                port: 41000
            }
            .encode(SECRET),
            "firefly online 3 41000"
        );
        assert_eq!(
            Message::Store {
                key: 6,
                force: false
            }
            .encode(SECRET),
            "firefly store 6 false"
        );
        assert_eq!(Message::Off.encode(SECRET), "firefly off");
        assert_eq!(
            Message::OffRequest { node_id: NodeId(1) }.encode(SECRET),
            "firefly off 1"
        );
    }

    // ============================================================
    // DECODING
    // ============================================================

    #[test]
    fn test_decode_every_verb() {
        let cases = [
            ("firefly register 5001", Message::Register { port: 5001 }),
            ("firefly id 2", Message::Id { node_id: NodeId(2) }),
            (
                "firefly online 2 5001",
                Message::Online {
                    node_id: NodeId(2),
                    port: 5001,
                },
            ),
            (
                "firefly store 9 true",
                Message::Store {
                    key: 9,
                    force: true,
                },
            ),
            ("firefly rehash 1", Message::Rehash { target: NodeId(1) }),
            ("firefly off 3", Message::OffRequest { node_id: NodeId(3) }),
            ("firefly off ", Message::Off),
        ];

        for (line, expected) in cases {
            assert_eq!(Message::decode(line, SECRET).unwrap(), expected, "{line}");
        }
    }

    #[test]
    fn test_decode_tolerates_extra_whitespace() {
        let msg = Message::decode("  firefly\tstore   12  false \r", SECRET).unwrap();
        assert_eq!(
            msg,
            Message::Store {
                key: 12,
                force: false
            }
        );
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let result = Message::decode("moth store 1 false", SECRET);
        assert!(matches!(result, Err(Error::Unauthenticated)));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            Message::decode("", SECRET),
            Err(Error::EmptyMessage)
        ));
        assert!(matches!(
            Message::decode("firefly", SECRET),
            Err(Error::EmptyMessage)
        ));
        assert!(matches!(
            Message::decode("firefly dance", SECRET),
            Err(Error::UnknownVerb(v)) if v == "dance"
        ));
        assert!(matches!(
            Message::decode("firefly store 5", SECRET),
            Err(Error::ArgumentCount { verb: "store", got: 1, .. })
        ));
        assert!(matches!(
            Message::decode("firefly off 1 2", SECRET),
            Err(Error::ArgumentCount { verb: "off", got: 2, .. })
        ));
        assert!(matches!(
            Message::decode("firefly store -4 false", SECRET),
            Err(Error::InvalidNumber(_))
        ));
        assert!(matches!(
            Message::decode("firefly register 70000", SECRET),
            Err(Error::InvalidNumber(_))
        ));
        assert!(matches!(
            Message::decode("firefly store 4 yes", SECRET),
            Err(Error::InvalidFlag(_))
        ));
    }

    // ============================================================
    // TRANSPORT
    // ============================================================

    #[tokio::test]
    async fn test_send_and_read_one_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let sender = tokio::spawn(async move {
            send_message(
                addr,
                &Message::Rehash { target: NodeId(1) },
                SECRET,
                Duration::from_secs(1),
            )
            .await
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        let line = read_line(&mut stream).await.unwrap();
        assert_eq!(line.as_deref(), Some("firefly rehash 1"));
        sender.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected_not_truncated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // cut at the cap this would read as a valid `rehash 1`
        let line = format!("firefly rehash 1{}3\n", " ".repeat(5000));
        assert!(Message::decode(&line, SECRET).is_err());

        let writer = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let _ = stream.write_all(line.as_bytes()).await;
            let _ = stream.shutdown().await;
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        let result = read_line(&mut stream).await;
        assert!(
            matches!(&result, Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData),
            "{result:?}"
        );
        drop(stream);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_line_filling_the_cap_is_accepted() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let padding = " ".repeat(MAX_LINE_BYTES as usize - "firefly rehash 1\n".len());
        let line = format!("firefly rehash 1{padding}\n");
        assert_eq!(line.len() as u64, MAX_LINE_BYTES);

        let writer = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(line.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        let read = read_line(&mut stream).await.unwrap().unwrap();
        assert_eq!(
            Message::decode(&read, SECRET).unwrap(),
            Message::Rehash { target: NodeId(1) }
        );
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_connection_reads_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        assert_eq!(read_line(&mut stream).await.unwrap(), None);
        client.await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_open_and_closed_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap();
        assert!(probe(open, Duration::from_secs(1)).await);

        drop(listener);
        assert!(!probe(open, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_send_to_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = send_message(addr, &Message::Off, SECRET, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
