// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared-printer enumeration for transport configuration.
//
// Asks the OS which printers it exposes: `Get-Printer` filtered to shares
// on Windows, `lpstat -a` (accepting queues) under CUPS. Enumeration is the
// extent of printer discovery here — no network probing.

use tokio::process::Command;
use tracing::debug;

use rollmark_core::error::{Result, RollmarkError};

/// Names of the printers the OS reports as available for spooling.
pub async fn shared_printers() -> Result<Vec<String>> {
    let output = list_command()
        .output()
        .await
        .map_err(|e| RollmarkError::PrinterEnumeration(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RollmarkError::PrinterEnumeration(
            stderr.trim().to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let printers = parse_printer_names(&stdout);
    debug!(count = printers.len(), "enumerated shared printers");
    Ok(printers)
}

#[cfg(windows)]
fn list_command() -> Command {
    let mut cmd = Command::new("powershell");
    cmd.arg("-NoProfile").arg("-Command").arg(
        "Get-Printer | Where-Object { $_.Shared } | Select-Object -ExpandProperty Name",
    );
    cmd
}

#[cfg(not(windows))]
fn list_command() -> Command {
    let mut cmd = Command::new("lpstat");
    cmd.arg("-a");
    cmd
}

/// Extract printer names from the enumeration output.
///
/// `lpstat -a` emits `"<queue> accepting requests since …"`; Windows emits
/// the bare share name, which may itself contain spaces.
fn parse_printer_names(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let name = line.split(" accepting ").next().unwrap_or(line).trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lpstat_style_output() {
        let output = "ZDesigner accepting requests since Mon 02 Mar 2026\n\
                      Office_Laser accepting requests since Mon 02 Mar 2026\n";
        assert_eq!(
            parse_printer_names(output),
            ["ZDesigner", "Office_Laser"]
        );
    }

    #[test]
    fn bare_names_keep_their_spaces() {
        assert_eq!(
            parse_printer_names("ZDesigner\nWarehouse Zebra\n"),
            ["ZDesigner", "Warehouse Zebra"]
        );
    }

    #[test]
    fn empty_output_means_no_printers() {
        assert!(parse_printer_names("").is_empty());
        assert!(parse_printer_names("\n\n").is_empty());
    }
}
