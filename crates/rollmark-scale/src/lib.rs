// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rollmark Scale — owns the serial link to the weighbridge scale: port
// discovery and selection, the connection state machine with bounded
// recovery, the dual-path weight stream decoder, and the data-silence
// watchdog. Everything the link learns leaves this crate as events on the
// shared bus; nothing outside it ever touches the port handle.

pub mod decoder;
pub mod manager;
pub mod ports;
pub mod watchdog;

pub use decoder::WeightDecoder;
pub use manager::{LinkCommand, ScaleLink};
pub use watchdog::{Watchdog, WatchdogVerdict};
