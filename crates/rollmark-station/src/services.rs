// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — initialises the backend subsystems and exposes
// the boundary contract: link events out, port/print/enumeration requests
// in. The UI collaborator (whatever renders the form) talks only to this
// struct and the event bus; it never sees a port handle or a ZPL string
// except as an opaque outcome.

use chrono::Local;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use rollmark_core::config::StationConfig;
use rollmark_core::error::{Result, RollmarkError};
use rollmark_core::events::{EventBus, LinkEvent};
use rollmark_core::types::{ConnectionState, PackagingRecord, PortInfo, PrintStatus};
use rollmark_label::compile;
use rollmark_print::dispatch;
use rollmark_scale::manager::ScaleLink;
use rollmark_scale::ports;

/// Running station services. One instance per process.
pub struct StationServices {
    config: StationConfig,
    bus: EventBus,
    link: ScaleLink,
    uploader: Option<crate::records::RecordUploader>,
}

#[allow(dead_code)]
impl StationServices {
    /// Validate the configuration, start the scale link, and prepare the
    /// record uploader. Call once at startup.
    pub fn init(config: StationConfig) -> Result<Self> {
        config.validate()?;

        let bus = EventBus::new();
        let link = ScaleLink::spawn(config.link.clone(), bus.clone());
        let uploader = config
            .record_endpoint
            .clone()
            .map(crate::records::RecordUploader::new);

        info!(
            scale_port = %config.link.default_port,
            transport = ?config.transport,
            uploads = uploader.is_some(),
            "station services initialised"
        );
        Ok(Self {
            config,
            bus,
            link,
            uploader,
        })
    }

    /// Subscribe to link events (`serial-status`, `update-weight`,
    /// `serial-error`).
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.bus.subscribe()
    }

    pub fn link_state(&self) -> ConnectionState {
        self.link.state()
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    // -- Scale link requests -------------------------------------------------

    /// On-demand serial port enumeration.
    pub async fn available_ports(&self) -> Result<Vec<PortInfo>> {
        tokio::task::spawn_blocking(ports::available_ports)
            .await
            .map_err(|e| RollmarkError::PortUnavailable(format!("enumeration task: {e}")))?
    }

    /// Change the working default port and reconnect.
    pub async fn select_port(&self, path: impl Into<String>) {
        self.link.select_port(path).await;
    }

    /// Manual recovery trigger; also the only way out of a parked link.
    pub async fn restart_link(&self) {
        self.link.restart().await;
    }

    /// Contract alias for [`restart_link`].
    pub async fn refresh_connection(&self) {
        self.restart_link().await;
    }

    // -- Printing ------------------------------------------------------------

    /// Printers the OS reports as available for spooling.
    pub async fn shared_printers(&self) -> Result<Vec<String>> {
        rollmark_print::shared_printers().await
    }

    /// Compile a record and dispatch it over the configured transport.
    ///
    /// The outcome always comes back to the submitter; a failed dispatch is
    /// never retried here. A successful print additionally posts the record
    /// to the external store when one is configured — upload failures are
    /// logged and do not change the print outcome.
    pub async fn print_label(&self, record: &PackagingRecord) -> PrintStatus {
        let document = compile(record, Local::now().naive_local());
        debug!(
            rows = document.row_count(),
            bytes = document.bytes().len(),
            "label compiled"
        );

        match dispatch(document.bytes(), &self.config.transport).await {
            Ok(()) => {
                if let Some(uploader) = &self.uploader {
                    if let Err(e) = uploader.upload(record).await {
                        warn!(%e, "record upload failed; label already printed");
                    }
                }
                PrintStatus::ok()
            }
            Err(e) => {
                warn!(%e, "label print failed");
                PrintStatus::failed(e.to_string())
            }
        }
    }

    /// Stop the link manager and drop the services.
    pub async fn shutdown(self) {
        self.link.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollmark_core::config::{LinkConfig, TransportConfig};

    /// A link config that fails fast and touches no real hardware.
    fn offline_link() -> LinkConfig {
        LinkConfig {
            default_port: "/dev/rollmark-test-absent".into(),
            alternative_ports: vec![],
            max_reconnect_attempts: 1,
            retry_interval_ms: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn refused_network_print_reports_failure_without_retry() {
        // A port with nothing listening behind it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = StationConfig {
            link: offline_link(),
            transport: TransportConfig::Network {
                address: "127.0.0.1".into(),
                port,
            },
            record_endpoint: None,
        };
        let svc = StationServices::init(config).unwrap();

        let record = PackagingRecord {
            roll_no: "R-1".into(),
            width: "450".into(),
            net_weight: "10".into(),
            core_weight: "2".into(),
            operator: "A. Rao".into(),
            ..Default::default()
        };

        let status = svc.print_label(&record).await;
        assert!(!status.success);
        let error = status.error.expect("failure carries the connection error");
        assert!(error.contains(&format!("127.0.0.1:{port}")));

        // One-shot semantics: resubmitting is an independent attempt that
        // fails the same way, proving nothing was queued for retry.
        let again = svc.print_label(&record).await;
        assert!(!again.success);

        svc.shutdown().await;
    }

    #[tokio::test]
    async fn init_rejects_a_shared_scale_and_printer_port() {
        let link = offline_link();
        let path = link.default_port.clone();
        let config = StationConfig {
            link,
            transport: TransportConfig::Serial { path, baud: 9600 },
            record_endpoint: None,
        };
        assert!(matches!(
            StationServices::init(config),
            Err(RollmarkError::Config(_))
        ));
    }

    #[tokio::test]
    async fn subscribers_receive_link_events() {
        let config = StationConfig {
            link: offline_link(),
            transport: TransportConfig::Network {
                address: "127.0.0.1".into(),
                port: 9100,
            },
            record_endpoint: None,
        };
        let svc = StationServices::init(config).unwrap();
        let mut events = svc.subscribe();

        // The failing link must narrate itself: at least one status and one
        // error event arrive without any request from us.
        let mut saw_status = false;
        let mut saw_error = false;
        let _ = tokio::time::timeout(std::time::Duration::from_secs(10), async {
            while !(saw_status && saw_error) {
                match events.recv().await {
                    Ok(LinkEvent::SerialStatus { .. }) => saw_status = true,
                    Ok(LinkEvent::SerialError { .. }) => saw_error = true,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        })
        .await;
        assert!(saw_status && saw_error);

        svc.shutdown().await;
    }
}
