// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Station configuration persistence (pretty JSON in the data directory).

use std::path::Path;

use tracing::warn;

use rollmark_core::config::StationConfig;
use rollmark_core::error::Result;

const CONFIG_FILE: &str = "station.json";

/// Load the persisted configuration, or `None` when absent or unreadable.
pub fn load_config(data_dir: &Path) -> Option<StationConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), %e, "ignoring unreadable station config");
            None
        }
    }
}

/// Write the configuration back as pretty JSON.
pub fn persist_config(data_dir: &Path, config: &StationConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
