// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language messages for the line operator.
//
// The operator station is staffed by packers, not technicians. Every error
// that reaches the screen is mapped to a short plain sentence plus a
// concrete next step.

use crate::error::{RollmarkError, TransportError};

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The station is already retrying on its own.
    Recovering,
    /// The operator must do something (check a cable, press restart).
    ActionRequired,
    /// A supervisor or technician is needed.
    Fault,
}

/// A narrated error: what happened and what to try.
#[derive(Debug, Clone)]
pub struct OperatorMessage {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Translate an error into something the operator can act on.
pub fn narrate(err: &RollmarkError) -> OperatorMessage {
    match err {
        RollmarkError::PortUnavailable(_) => OperatorMessage {
            message: "The scale is not plugged in or not visible.".into(),
            suggestion: "Check the scale's cable, then press Restart Connection.".into(),
            severity: Severity::ActionRequired,
        },

        RollmarkError::OpenFailure { port, .. } => OperatorMessage {
            message: format!("Could not connect to the scale on {port}."),
            suggestion: "The station will retry on its own. If this keeps \
                         happening, another program may be holding the port."
                .into(),
            severity: Severity::Recovering,
        },

        RollmarkError::WriteFailure(_) | RollmarkError::WatchdogStall { .. } => OperatorMessage {
            message: "The scale stopped responding.".into(),
            suggestion: "The station is reconnecting. Make sure the scale is powered on.".into(),
            severity: Severity::Recovering,
        },

        RollmarkError::ReconnectExhausted { attempts } => OperatorMessage {
            message: format!("Gave up reconnecting to the scale after {attempts} tries."),
            suggestion: "Check the scale's cable and power, then press Restart Connection.".into(),
            severity: Severity::ActionRequired,
        },

        RollmarkError::Transport(t) => narrate_transport(t),

        RollmarkError::PrinterEnumeration(detail) => OperatorMessage {
            message: "Could not list the shared printers.".into(),
            suggestion: format!("Try again in a moment. ({detail})"),
            severity: Severity::ActionRequired,
        },

        RollmarkError::Upload(detail) => OperatorMessage {
            message: "The record was printed but not saved to the server.".into(),
            suggestion: format!("Keep the paper copy and tell your supervisor. ({detail})"),
            severity: Severity::ActionRequired,
        },

        RollmarkError::Config(detail) => OperatorMessage {
            message: "The station is set up incorrectly.".into(),
            suggestion: format!("A technician needs to fix the configuration. ({detail})"),
            severity: Severity::Fault,
        },

        RollmarkError::Io(e) => OperatorMessage {
            message: "A file operation failed.".into(),
            suggestion: format!("Restart the station software. ({e})"),
            severity: Severity::Fault,
        },

        RollmarkError::Serialization(e) => OperatorMessage {
            message: "The station could not read its settings.".into(),
            suggestion: format!("A technician needs to check the config file. ({e})"),
            severity: Severity::Fault,
        },
    }
}

fn narrate_transport(err: &TransportError) -> OperatorMessage {
    match err {
        TransportError::Usb { printer, detail } => OperatorMessage {
            message: format!("Could not send the label to printer \"{printer}\"."),
            suggestion: format!(
                "Check the printer is on and shared, then print again. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },
        TransportError::Network { addr, detail } => OperatorMessage {
            message: format!("Could not reach the label printer at {addr}."),
            suggestion: format!(
                "Check the printer's network cable, then print again. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },
        TransportError::Serial { path, detail } => OperatorMessage {
            message: format!("Could not send the label over {path}."),
            suggestion: format!("Check the printer cable, then print again. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_reconnect_requires_action() {
        let msg = narrate(&RollmarkError::ReconnectExhausted { attempts: 10 });
        assert_eq!(msg.severity, Severity::ActionRequired);
        assert!(msg.message.contains("10"));
    }

    #[test]
    fn transport_detail_is_preserved() {
        let err = RollmarkError::Transport(TransportError::Network {
            addr: "10.0.0.9:9100".into(),
            detail: "connection refused".into(),
        });
        let msg = narrate(&err);
        assert!(msg.suggestion.contains("connection refused"));
        assert!(msg.message.contains("10.0.0.9:9100"));
    }

    #[test]
    fn open_failure_is_self_recovering() {
        let err = RollmarkError::OpenFailure {
            port: "COM5".into(),
            detail: "access denied".into(),
        };
        assert_eq!(narrate(&err).severity, Severity::Recovering);
    }
}
