// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rollmark — production-line scale and label station.
//
// Entry point. Initialises logging, loads the station configuration, starts
// the backend services, and narrates link events to the log until
// interrupted. The operator UI attaches through the service layer and the
// event bus; this binary is what keeps them running.

mod data_dir;
mod records;
mod services;
mod store;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use rollmark_core::events::LinkEvent;
use rollmark_core::operator;

use services::StationServices;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Rollmark station starting");

    let dir = data_dir::data_dir();
    let config = store::load_config(&dir).unwrap_or_else(|| {
        // First run: write the defaults so a technician has a file to edit.
        let defaults = rollmark_core::config::StationConfig::default();
        if let Err(e) = store::persist_config(&dir, &defaults) {
            warn!(%e, "could not write default station config");
        }
        defaults
    });

    let svc = match StationServices::init(config) {
        Ok(svc) => svc,
        Err(e) => {
            let narrated = operator::narrate(&e);
            tracing::error!(%e, "station failed to start");
            eprintln!("{} {}", narrated.message, narrated.suggestion);
            std::process::exit(1);
        }
    };

    let mut events = svc.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(LinkEvent::UpdateWeight(reading)) => {
                    info!(weight = %reading.value, port = %reading.source_port, "weight");
                }
                Ok(LinkEvent::SerialStatus { connected, port }) => {
                    info!(connected, port = ?port, "link status");
                }
                Ok(LinkEvent::SerialError { context, message, .. }) => {
                    warn!(context = %context, message = %message, "link error");
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    svc.shutdown().await;
    info!("Rollmark station stopped");
}
