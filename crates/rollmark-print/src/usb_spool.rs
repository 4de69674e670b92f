// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// USB spool transport: write the program to a temporary file and hand it to
// the OS spooler for a named printer share.
//
// On Windows the share is fed with a binary `copy` to `\\localhost\<share>`,
// which is how ZPL reaches USB-attached Zebra printers shared by the OS.
// Elsewhere the file goes through `lpr -P`, the raw CUPS queue path. In
// both cases the spooler's error text is reported verbatim.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use rollmark_core::error::TransportError;

/// Spool program bytes to the named printer share.
pub async fn send(printer_name: &str, document: &[u8]) -> Result<(), TransportError> {
    let usb_err = |detail: String| TransportError::Usb {
        printer: printer_name.to_string(),
        detail,
    };

    let spool_file = write_spool_file(document).map_err(usb_err)?;
    debug!(
        printer = printer_name,
        file = %spool_file.path().display(),
        bytes = document.len(),
        "spooling label file"
    );

    let output = spool_command(printer_name, spool_file.path())
        .output()
        .await
        .map_err(|e| usb_err(format!("spawn spooler: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            format!("spooler exited with {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        return Err(usb_err(detail));
    }

    info!(printer = printer_name, bytes = document.len(), "label spooled");
    Ok(())
}

/// Persist the program to a temporary file the spooler can read. The file
/// is deleted when the handle drops, after the spool command has finished.
fn write_spool_file(document: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|e| format!("create spool file: {e}"))?;
    file.write_all(document)
        .and_then(|_| file.flush())
        .map_err(|e| format!("write spool file: {e}"))?;
    Ok(file)
}

#[cfg(windows)]
fn spool_command(printer_name: &str, file: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C")
        .arg("copy")
        .arg("/B")
        .arg(file)
        .arg(format!(r"\\localhost\{printer_name}"));
    cmd
}

#[cfg(not(windows))]
fn spool_command(printer_name: &str, file: &Path) -> Command {
    let mut cmd = Command::new("lpr");
    cmd.arg("-P").arg(printer_name).arg(file);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn spool_file_holds_the_program_bytes() {
        let file = write_spool_file(b"^XA^FDspool^FS^XZ").unwrap();
        let mut contents = Vec::new();
        std::fs::File::open(file.path())
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents, b"^XA^FDspool^FS^XZ");
    }

    #[cfg(not(windows))]
    #[test]
    fn unix_spool_goes_through_lpr() {
        let cmd = spool_command("ZDesigner", Path::new("/tmp/label.zpl"));
        let cmd = cmd.as_std();
        assert_eq!(cmd.get_program(), "lpr");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
        assert_eq!(args, ["-P", "ZDesigner", "/tmp/label.zpl"]);
    }

    #[cfg(windows)]
    #[test]
    fn windows_spool_copies_to_the_share() {
        let cmd = spool_command("ZDesigner", Path::new(r"C:\Temp\label.zpl"));
        let cmd = cmd.as_std();
        assert_eq!(cmd.get_program(), "cmd");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
        assert_eq!(args[0], "/C");
        assert_eq!(args[1], "copy");
        assert_eq!(args[2], "/B");
        assert_eq!(args[4], r"\\localhost\ZDesigner");
    }
}
