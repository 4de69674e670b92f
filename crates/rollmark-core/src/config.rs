// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Station configuration: scale link settings and the printer transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollmarkError};

/// Scale serial link settings. Immutable after load; `select-port` requests
/// update the manager's working copy, not the persisted file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkConfig {
    /// Port tried first on every connect cycle.
    pub default_port: String,
    pub baud_rate: u32,
    /// Fallback ports tried in listed order. Empty list = fixed-port mode:
    /// no scanning, the default either resolves or the attempt fails.
    pub alternative_ports: Vec<String>,
    /// Consecutive failed opens tolerated before the link parks in `Failed`.
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts.
    pub retry_interval_ms: u64,
    /// Silence on the line longer than this triggers the watchdog.
    pub stall_timeout_ms: u64,
    /// Watchdog polling cadence while connected.
    pub watchdog_poll_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_port: "COM5".into(),
            baud_rate: 9600,
            alternative_ports: vec!["COM3".into(), "COM4".into(), "COM6".into()],
            max_reconnect_attempts: 10,
            retry_interval_ms: 1_000,
            stall_timeout_ms: 10_000,
            watchdog_poll_ms: 2_000,
        }
    }
}

impl LinkConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.stall_timeout_ms)
    }

    pub fn watchdog_poll(&self) -> Duration {
        Duration::from_millis(self.watchdog_poll_ms)
    }

    /// Fixed-port mode disables scanning entirely.
    pub fn fixed_port_mode(&self) -> bool {
        self.alternative_ports.is_empty()
    }
}

/// Default raw TCP print port (JetDirect; ZPL printers listen here).
pub const RAW_PRINT_PORT: u16 = 9100;

fn default_print_port() -> u16 {
    RAW_PRINT_PORT
}

/// How compiled label documents reach the printer. Exactly one variant is
/// active per station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Spool a temporary file to a named OS printer share.
    UsbSpool { printer_name: String },
    /// Raw socket to a network printer.
    Network {
        address: String,
        #[serde(default = "default_print_port")]
        port: u16,
    },
    /// Dedicated serial write, independent of the scale link.
    Serial { path: String, baud: u32 },
}

/// Top-level station configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationConfig {
    pub link: LinkConfig,
    pub transport: TransportConfig,
    /// Optional endpoint for posting packaging records to the external
    /// record store. `None` disables uploads.
    pub record_endpoint: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            transport: TransportConfig::Serial {
                path: "COM4".into(),
                baud: 9600,
            },
            record_endpoint: None,
        }
    }
}

impl StationConfig {
    /// Startup validation.
    ///
    /// The scale and the printer are independent devices even when both are
    /// serial; routing them through one physical port is a misconfiguration
    /// and is rejected before any handle is opened.
    pub fn validate(&self) -> Result<()> {
        if let TransportConfig::Serial { path, .. } = &self.transport {
            if path == &self.link.default_port {
                return Err(RollmarkError::Config(format!(
                    "printer transport and scale link both use {path}; \
                     the two devices must not share a port"
                )));
            }
        }
        if self.link.max_reconnect_attempts == 0 {
            return Err(RollmarkError::Config(
                "maxReconnectAttempts must be at least 1".into(),
            ));
        }
        if self.link.watchdog_poll_ms == 0 {
            return Err(RollmarkError::Config(
                "watchdogPollMs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_multi_port() {
        let cfg = LinkConfig::default();
        assert_eq!(cfg.default_port, "COM5");
        assert!(!cfg.fixed_port_mode());
        assert_eq!(cfg.max_reconnect_attempts, 10);
    }

    #[test]
    fn empty_alternatives_is_fixed_port_mode() {
        let cfg = LinkConfig {
            alternative_ports: vec![],
            ..Default::default()
        };
        assert!(cfg.fixed_port_mode());
    }

    #[test]
    fn shared_port_is_rejected() {
        let cfg = StationConfig {
            transport: TransportConfig::Serial {
                path: "COM5".into(),
                baud: 9600,
            },
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(RollmarkError::Config(_))));
    }

    #[test]
    fn distinct_ports_pass_validation() {
        assert!(StationConfig::default().validate().is_ok());
    }

    #[test]
    fn network_transport_defaults_to_raw_port() {
        let t: TransportConfig =
            serde_json::from_str(r#"{"type":"network","address":"192.168.1.100"}"#).unwrap();
        assert_eq!(
            t,
            TransportConfig::Network {
                address: "192.168.1.100".into(),
                port: 9100
            }
        );
    }
}
