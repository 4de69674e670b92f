// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Weight stream decoder.
//
// Two extraction paths run over the same byte stream: a CR LF line framer
// and a raw-chunk path that emits every delivered chunk as-is. The scale
// does not reliably send the delimiter, so neither path alone is enough;
// the cost is that a well-framed transmission produces two readings for one
// physical frame. Consumers resolve that by overwriting — last reading
// wins — never by averaging or rejecting.

use chrono::{DateTime, Utc};

use rollmark_core::types::WeightReading;

const DELIMITER: &[u8; 2] = b"\r\n";

/// Stateful decoder for one link session. Reinstalled on every reconnect so
/// a partial line from a dead session never bleeds into the next.
#[derive(Debug, Default)]
pub struct WeightDecoder {
    line_buf: Vec<u8>,
}

impl WeightDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk from the transport; returns the readings it produced.
    ///
    /// Line-framed readings come first (one per completed CR LF line, trimmed,
    /// empty lines skipped), then the raw-chunk reading (the chunk itself,
    /// trimmed, skipped when nothing but whitespace remains).
    pub fn feed(&mut self, chunk: &[u8], source_port: &str, now: DateTime<Utc>) -> Vec<WeightReading> {
        let mut readings = Vec::new();

        self.line_buf.extend_from_slice(chunk);
        while let Some(pos) = find_delimiter(&self.line_buf) {
            let line: Vec<u8> = self.line_buf.drain(..pos + DELIMITER.len()).collect();
            let text = String::from_utf8_lossy(&line[..pos]);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                readings.push(reading(trimmed, source_port, now));
            }
        }

        let raw = String::from_utf8_lossy(chunk);
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            readings.push(reading(trimmed, source_port, now));
        }

        readings
    }

    /// Bytes currently held waiting for a delimiter.
    pub fn pending(&self) -> usize {
        self.line_buf.len()
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(DELIMITER.len()).position(|w| w == DELIMITER)
}

fn reading(value: &str, source_port: &str, now: DateTime<Utc>) -> WeightReading {
    WeightReading {
        value: value.to_string(),
        timestamp: now,
        source_port: source_port.to_string(),
    }
}
