// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data-silence watchdog for the scale link.
//
// The link manager polls the watchdog on a fixed cadence while connected.
// Once the line has been silent past the stall threshold the watchdog first
// asks for a non-destructive responsiveness probe; if data still has not
// arrived by the next poll it declares a stall. Time is injected so the
// behaviour is testable without sleeping.

use std::time::{Duration, Instant};

/// What the link manager should do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    /// Data arrived recently; nothing to do.
    Healthy,
    /// Silence past the threshold — send a benign probe write. A failed
    /// probe write is itself a stall.
    Probe,
    /// The probe bought no data; treat like an open failure.
    Stalled,
}

/// Tracks time since the last byte and the probe escalation step.
#[derive(Debug)]
pub struct Watchdog {
    stall_timeout: Duration,
    last_data: Instant,
    probe_sent: bool,
}

impl Watchdog {
    /// A fresh watchdog considers "now" the last data time, so a stall can
    /// only be declared a full `stall_timeout` after (re)connection.
    pub fn new(stall_timeout: Duration) -> Self {
        Self::with_origin(stall_timeout, Instant::now())
    }

    fn with_origin(stall_timeout: Duration, origin: Instant) -> Self {
        Self {
            stall_timeout,
            last_data: origin,
            probe_sent: false,
        }
    }

    /// Record data arrival (either decoder path calls this per chunk).
    pub fn record_data(&mut self, now: Instant) {
        self.last_data = now;
        self.probe_sent = false;
    }

    /// Evaluate the line at poll time.
    pub fn poll(&mut self, now: Instant) -> WatchdogVerdict {
        if now.duration_since(self.last_data) <= self.stall_timeout {
            return WatchdogVerdict::Healthy;
        }
        if self.probe_sent {
            WatchdogVerdict::Stalled
        } else {
            self.probe_sent = true;
            WatchdogVerdict::Probe
        }
    }

    pub fn silence(&self, now: Instant) -> Duration {
        now.duration_since(self.last_data)
    }
}
