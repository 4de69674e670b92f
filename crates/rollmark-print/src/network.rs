// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP label delivery (JetDirect, port 9100).
//
// The simplest transport: open a socket and dump the program bytes. Label
// printers interpret the ZPL natively; there is no negotiation, no job
// tracking, and no feedback beyond the socket itself. A failed write may
// have partially transmitted — resubmission is the caller's decision.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use rollmark_core::error::TransportError;

/// Timeout for the TCP connect. Label programs are a few kilobytes; a
/// printer that does not accept the connection quickly is not coming back.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Send program bytes to `address:port` over a raw socket.
pub async fn send(address: &str, port: u16, document: &[u8]) -> Result<(), TransportError> {
    let addr = format!("{address}:{port}");
    let net_err = |detail: String| TransportError::Network {
        addr: addr.clone(),
        detail,
    };

    debug!(addr = %addr, bytes = document.len(), "connecting to network printer");

    let mut stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            net_err(format!(
                "connect timed out after {}s",
                CONNECT_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| net_err(e.to_string()))?;

    stream
        .write_all(document)
        .await
        .map_err(|e| net_err(format!("write: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| net_err(format!("flush: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e| net_err(format!("shutdown: {e}")))?;

    info!(addr = %addr, bytes = document.len(), "label sent over network");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn delivers_the_exact_program_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        send("127.0.0.1", addr.port(), b"^XA^FDtest^FS^XZ")
            .await
            .unwrap();

        assert_eq!(server.await.unwrap(), b"^XA^FDtest^FS^XZ");
    }

    #[tokio::test]
    async fn refused_connection_surfaces_the_os_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = send("127.0.0.1", port, b"^XA^XZ").await.unwrap_err();
        match err {
            TransportError::Network { addr, detail } => {
                assert_eq!(addr, format!("127.0.0.1:{port}"));
                assert!(!detail.is_empty());
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
