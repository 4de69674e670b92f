// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rollmark — Core types, errors, configuration, and the event contract
// shared across all crates.

pub mod config;
pub mod error;
pub mod events;
pub mod operator;
pub mod types;

pub use config::{LinkConfig, StationConfig, TransportConfig};
pub use error::{RollmarkError, TransportError};
pub use events::{EventBus, LinkEvent};
pub use types::*;
