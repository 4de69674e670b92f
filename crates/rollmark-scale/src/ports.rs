// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serial port enumeration and the candidate-selection policy.

use rollmark_core::config::LinkConfig;
use rollmark_core::error::{Result, RollmarkError};
use rollmark_core::types::PortInfo;

/// Enumerate the serial ports the OS currently reports.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|e| RollmarkError::PortUnavailable(format!("enumeration failed: {e}")))?;

    Ok(ports
        .into_iter()
        .map(|p| {
            let (port_type, manufacturer, product) = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => {
                    ("USB".to_string(), info.manufacturer, info.product)
                }
                serialport::SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None, None),
                serialport::SerialPortType::PciPort => ("PCI".to_string(), None, None),
                serialport::SerialPortType::Unknown => ("Unknown".to_string(), None, None),
            };
            PortInfo {
                path: p.port_name,
                port_type,
                manufacturer,
                product,
            }
        })
        .collect())
}

/// Pick the port to open from an enumeration snapshot.
///
/// The configured default always wins when present, regardless of where the
/// OS lists it. Alternatives are consulted in their listed order, and only
/// when any are configured: fixed-port mode never scans, so an absent
/// default resolves to nothing immediately.
pub fn choose_port(config: &LinkConfig, available: &[String]) -> Option<String> {
    let has = |path: &str| available.iter().any(|p| p == path);

    if has(&config.default_port) {
        return Some(config.default_port.clone());
    }
    if config.fixed_port_mode() {
        return None;
    }
    config
        .alternative_ports
        .iter()
        .find(|alt| has(alt))
        .cloned()
}
