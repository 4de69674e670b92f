// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transport dispatcher.
//
// One explicit match over the transport enum; adding a transport means
// adding a variant and an arm, not touching the existing ones. Dispatch is
// one-shot: a failed attempt may have partially transmitted, and whether to
// resubmit is the caller's call.

use tracing::instrument;

use rollmark_core::config::TransportConfig;
use rollmark_core::error::TransportError;

use crate::{network, serial, usb_spool};

/// Deliver program bytes over the configured transport.
#[instrument(skip(document), fields(bytes = document.len()))]
pub async fn dispatch(
    document: &[u8],
    transport: &TransportConfig,
) -> Result<(), TransportError> {
    match transport {
        TransportConfig::UsbSpool { printer_name } => {
            usb_spool::send(printer_name, document).await
        }
        TransportConfig::Network { address, port } => {
            network::send(address, *port, document).await
        }
        TransportConfig::Serial { path, baud } => serial::send(path, *baud, document).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn dispatch_routes_to_the_network_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let transport = TransportConfig::Network {
            address: "127.0.0.1".into(),
            port: addr.port(),
        };
        dispatch(b"^XA^XZ", &transport).await.unwrap();
        assert_eq!(server.await.unwrap(), b"^XA^XZ");
    }

    #[tokio::test]
    async fn dispatch_routes_to_the_serial_transport() {
        let transport = TransportConfig::Serial {
            path: "/dev/rollmark-test-absent".into(),
            baud: 9600,
        };
        let err = dispatch(b"^XA^XZ", &transport).await.unwrap_err();
        assert!(matches!(err, TransportError::Serial { .. }));
    }
}
