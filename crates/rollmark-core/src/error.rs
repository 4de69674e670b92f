// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Rollmark.

use thiserror::Error;

/// Top-level error type for all Rollmark operations.
///
/// Link-layer variants are handled inside the recovery state machine and
/// surface to the outside only as `serial-error` events; print-time variants
/// are returned to the caller of the dispatch and never retried silently.
#[derive(Debug, Error)]
pub enum RollmarkError {
    // -- Scale link errors --
    #[error("no scale port available: {0}")]
    PortUnavailable(String),

    #[error("failed to open scale port {port}: {detail}")]
    OpenFailure { port: String, detail: String },

    #[error("scale link write failed: {0}")]
    WriteFailure(String),

    #[error("no data from scale for {elapsed_secs}s")]
    WatchdogStall { elapsed_secs: u64 },

    #[error("scale reconnect abandoned after {attempts} attempts; restart required")]
    ReconnectExhausted { attempts: u32 },

    // -- Print errors --
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("shared printer enumeration failed: {0}")]
    PrinterEnumeration(String),

    // -- Record store --
    #[error("record upload failed: {0}")]
    Upload(String),

    // -- Configuration / ambient --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Print-time failure, one variant per transport.
///
/// The `detail` field carries the underlying OS error text verbatim so an
/// operator can decide whether to resubmit on a different transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("USB spool to printer share {printer} failed: {detail}")]
    Usb { printer: String, detail: String },

    #[error("network print to {addr} failed: {detail}")]
    Network { addr: String, detail: String },

    #[error("serial print on {path} failed: {detail}")]
    Serial { path: String, detail: String },
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RollmarkError>;
