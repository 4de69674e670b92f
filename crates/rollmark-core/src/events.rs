// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The boundary event contract between the link core and its UI collaborator.
//
// Event names are the contract: a subscriber sees `serial-status`,
// `update-weight`, and `serial-error` payloads regardless of what transport
// carries them to the presentation layer. The bus is a plain broadcast
// channel so zero, one, or many subscribers are all fine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::types::WeightReading;

/// Default buffer depth for the event channel. A lagging subscriber loses
/// the oldest events, never blocks the link manager.
const EVENT_BUFFER: usize = 256;

/// Everything the link core tells the outside world.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum LinkEvent {
    /// Pushed on every connection state change.
    #[serde(rename = "serial-status")]
    SerialStatus {
        connected: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        port: Option<String>,
    },

    /// Pushed for every decoded reading.
    #[serde(rename = "update-weight")]
    UpdateWeight(WeightReading),

    /// Pushed on any link failure, before recovery is scheduled.
    #[serde(rename = "serial-error")]
    SerialError {
        context: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl LinkEvent {
    pub fn error(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SerialError {
            context: context.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Publish/subscribe channel for [`LinkEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LinkEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    /// Attach a new subscriber. Events published before this call are not
    /// replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers. Publishing with no
    /// subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: LinkEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
