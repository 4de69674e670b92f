// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Rollmark label station.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of the scale serial link.
///
/// Exactly one instance exists per process, owned by the link manager task.
/// Transitions happen only inside the manager; everyone else observes them
/// through `serial-status` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No link activity; waiting for a start or restart request.
    Idle,
    /// Enumerating candidate ports.
    Discovering,
    /// A candidate resolved; the open call is in flight.
    Opening,
    /// Link is up and the decoder is installed.
    Connected,
    /// Explicit close in progress.
    Closing,
    /// A bounded reconnect cycle is running.
    Recovering,
    /// Reconnect attempts exhausted — terminal until an explicit restart.
    Failed,
}

impl ConnectionState {
    /// Whether the link is usable for reading weight data.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A single decoded weight reading.
///
/// `value` is the trimmed raw text from the device, not yet validated as
/// numeric — downstream consumers parse it. Because the decoder keeps two
/// extraction paths active, one physical frame may yield two readings with
/// the same or very close timestamps; consumers resolve this by letting the
/// last reading win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightReading {
    pub value: String,
    pub timestamp: DateTime<Utc>,
    pub source_port: String,
}

/// A packaging record as composed by the operator.
///
/// Absence is always the empty string, never a missing field, so the label
/// compiler can apply uniform "only annotate if present" logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagingRecord {
    pub date: String,
    pub roll_no: String,
    pub width: String,
    pub film: String,
    pub coat_colors: String,
    pub style: String,
    pub length: String,
    pub net_weight: String,
    pub core_weight: String,
    pub gross_weight: String,
    pub operator: String,
}

/// Metadata for one enumerated serial port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortInfo {
    pub path: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

/// Outcome of a single print request, returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintStatus {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrintStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
