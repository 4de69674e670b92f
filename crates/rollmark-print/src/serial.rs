// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dedicated serial label delivery.
//
// The printer's port is a separate physical device from the scale link even
// when both are serial; the handle here is opened per print call and closed
// when the call ends, whatever the outcome. Configuration that points both
// at the same path is rejected earlier, at startup validation.

use std::io::Write;
use std::time::Duration;

use tracing::info;

use rollmark_core::error::TransportError;

/// Write timeout on the printer port.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open `path`, write the program bytes, and close the port.
pub async fn send(path: &str, baud: u32, document: &[u8]) -> Result<(), TransportError> {
    let path = path.to_string();
    let document = document.to_vec();
    let bytes = document.len();

    let task_path = path.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut port = serialport::new(task_path.as_str(), baud)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| format!("open: {e}"))?;
        port.write_all(&document)
            .and_then(|_| port.flush())
            .map_err(|e| format!("write: {e}"))
        // The port closes on drop, success or not.
    })
    .await;

    let outcome = match result {
        Ok(inner) => inner,
        Err(e) => Err(format!("print task: {e}")),
    };

    outcome.map_err(|detail| TransportError::Serial {
        path: path.clone(),
        detail,
    })?;

    info!(port = %path, bytes, "label sent over serial");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_port_surfaces_the_open_error() {
        let err = send("/dev/rollmark-test-absent", 9600, b"^XA^XZ")
            .await
            .unwrap_err();
        match err {
            TransportError::Serial { path, detail } => {
                assert_eq!(path, "/dev/rollmark-test-absent");
                assert!(detail.starts_with("open:"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
