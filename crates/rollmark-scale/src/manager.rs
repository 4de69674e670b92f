// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scale link manager: owns the serial connection's lifecycle
// (probe → open → monitor → recover) and pushes everything it learns onto
// the event bus.
//
// All mutable link state lives in one task. Serial data, watchdog polls,
// and commands arrive as discrete events on that task, so nothing here
// needs a lock beyond the `busy` reentrancy flag: a restart, port-select,
// or stall trigger that fires while an open sequence is running is dropped,
// not queued. The port handle itself is shared only with the blocking
// reader thread (reads) and short-lived probe writes.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use serialport::SerialPort;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use rollmark_core::config::LinkConfig;
use rollmark_core::error::RollmarkError;
use rollmark_core::events::{EventBus, LinkEvent};
use rollmark_core::types::ConnectionState;

use crate::decoder::WeightDecoder;
use crate::ports;
use crate::watchdog::{Watchdog, WatchdogVerdict};

/// Read timeout on the scale port. Short enough that the reader thread
/// notices the stop flag promptly.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Benign bytes for the watchdog's responsiveness probe. The scale ignores
/// bare line terminators.
const PROBE: &[u8] = b"\r\n";

type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

/// Requests the outside world may make of the link.
#[derive(Debug, Clone)]
pub enum LinkCommand {
    /// Re-arm the connect cycle (also the only way out of `Failed`).
    Restart,
    /// Change the working default port and reconnect.
    SelectPort(String),
    /// Close the link and stay idle.
    Close,
    /// Tear down the manager task entirely.
    Shutdown,
}

enum ReaderMsg {
    Chunk(Vec<u8>),
    Closed(String),
}

enum LoopEvent {
    Command(LinkCommand),
    Reader { generation: u64, msg: ReaderMsg },
}

/// Handle to the running link manager task.
pub struct ScaleLink {
    events_tx: mpsc::Sender<LoopEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    task: tokio::task::JoinHandle<()>,
}

impl ScaleLink {
    /// Spawn the manager task and start the first connect cycle.
    pub fn spawn(config: LinkConfig, bus: EventBus) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let task = LinkTask::new(config, bus, state_tx, events_tx.clone());
        let handle = tokio::spawn(task.run(events_rx));
        Self {
            events_tx,
            state_rx,
            task: handle,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// A watcher for state changes (used by status displays and tests).
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    pub async fn restart(&self) {
        self.send(LinkCommand::Restart).await;
    }

    pub async fn select_port(&self, path: impl Into<String>) {
        self.send(LinkCommand::SelectPort(path.into())).await;
    }

    pub async fn close(&self) {
        self.send(LinkCommand::Close).await;
    }

    /// Tear down the task and wait for it to finish.
    pub async fn shutdown(self) {
        self.send(LinkCommand::Shutdown).await;
        let _ = self.task.await;
    }

    async fn send(&self, cmd: LinkCommand) {
        let _ = self.events_tx.send(LoopEvent::Command(cmd)).await;
    }
}

/// The single-task state machine behind [`ScaleLink`].
struct LinkTask {
    config: LinkConfig,
    bus: EventBus,
    state: ConnectionState,
    state_tx: watch::Sender<ConnectionState>,
    /// Cloned into each reader thread so serial data joins the same queue
    /// as commands and is processed in arrival order.
    events_tx: mpsc::Sender<LoopEvent>,
    /// Reentrancy guard over the open sequence.
    busy: bool,
    /// Consecutive failed opens in the current cycle.
    attempts: u32,
    /// Bumped per connection; messages from a superseded reader are ignored.
    generation: u64,
    decoder: WeightDecoder,
    watchdog: Watchdog,
    port: Option<SharedPort>,
    reader_stop: Option<Arc<AtomicBool>>,
    current_port: Option<String>,
    retry_at: Option<tokio::time::Instant>,
}

impl LinkTask {
    fn new(
        config: LinkConfig,
        bus: EventBus,
        state_tx: watch::Sender<ConnectionState>,
        events_tx: mpsc::Sender<LoopEvent>,
    ) -> Self {
        let watchdog = Watchdog::new(config.stall_timeout());
        Self {
            config,
            bus,
            state: ConnectionState::Idle,
            state_tx,
            events_tx,
            busy: false,
            attempts: 0,
            generation: 0,
            decoder: WeightDecoder::new(),
            watchdog,
            port: None,
            reader_stop: None,
            current_port: None,
            retry_at: None,
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<LoopEvent>) {
        self.begin_cycle("Link start").await;

        let mut poll = tokio::time::interval(self.config.watchdog_poll());
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let retry_at = self.retry_at;
            tokio::select! {
                event = events.recv() => match event {
                    None | Some(LoopEvent::Command(LinkCommand::Shutdown)) => {
                        self.release_port();
                        break;
                    }
                    Some(LoopEvent::Command(cmd)) => self.handle_command(cmd).await,
                    Some(LoopEvent::Reader { generation, msg }) => {
                        self.handle_reader(generation, msg).await;
                    }
                },
                _ = poll.tick(), if self.state.is_connected() => self.handle_poll().await,
                _ = tokio::time::sleep_until(retry_at.unwrap_or_else(tokio::time::Instant::now)),
                    if retry_at.is_some() =>
                {
                    self.retry_at = None;
                    self.attempt_open().await;
                }
            }
        }
        debug!("link manager task finished");
    }

    async fn handle_command(&mut self, cmd: LinkCommand) {
        match cmd {
            LinkCommand::Restart => self.begin_cycle("Restart requested").await,
            LinkCommand::SelectPort(path) => {
                if self.busy {
                    debug!(port = %path, "port selection dropped; open sequence in progress");
                    return;
                }
                info!(port = %path, "default port changed by request");
                self.config.default_port = path;
                self.begin_cycle("Port selection").await;
            }
            LinkCommand::Close => {
                self.retry_at = None;
                self.release_connection();
                if self.state != ConnectionState::Idle {
                    self.set_state(ConnectionState::Idle);
                }
                self.busy = false;
            }
            // Shutdown is intercepted by the run loop before dispatch.
            LinkCommand::Shutdown => {}
        }
    }

    /// Start (or restart) a full connect cycle. Gated by the busy flag:
    /// overlapping requests are dropped rather than queued.
    async fn begin_cycle(&mut self, context: &str) {
        if self.busy {
            debug!(context, "connect request dropped; open sequence in progress");
            return;
        }
        self.busy = true;
        self.attempts = 0;
        self.retry_at = None;
        self.release_connection();
        self.attempt_open().await;
    }

    /// One discovery + open attempt.
    async fn attempt_open(&mut self) {
        self.set_state(ConnectionState::Discovering);

        let snapshot = tokio::task::spawn_blocking(ports::available_ports).await;
        let available: Vec<String> = match snapshot {
            Ok(Ok(ports)) => ports.into_iter().map(|p| p.path).collect(),
            Ok(Err(e)) => {
                self.fail_attempt("Port discovery failed", e.to_string()).await;
                return;
            }
            Err(e) => {
                self.fail_attempt("Port discovery failed", format!("discovery task: {e}"))
                    .await;
                return;
            }
        };

        let Some(candidate) = ports::choose_port(&self.config, &available) else {
            let detail = if self.config.fixed_port_mode() {
                format!("fixed port {} not present", self.config.default_port)
            } else {
                format!(
                    "neither {} nor any alternative is present",
                    self.config.default_port
                )
            };
            self.fail_attempt(
                "No available serial ports found",
                RollmarkError::PortUnavailable(detail).to_string(),
            )
            .await;
            return;
        };

        self.set_state(ConnectionState::Opening);
        let path = candidate.clone();
        let baud = self.config.baud_rate;
        let opened = tokio::task::spawn_blocking(move || {
            serialport::new(path.as_str(), baud)
                .timeout(READ_TIMEOUT)
                .open()
        })
        .await;

        match opened {
            Ok(Ok(port)) => self.on_opened(candidate, port),
            Ok(Err(e)) => {
                self.fail_attempt("Port initialization failed", format!("{candidate}: {e}"))
                    .await;
            }
            Err(e) => {
                self.fail_attempt("Port initialization failed", format!("open task: {e}"))
                    .await;
            }
        }
    }

    /// Record a failed attempt: surface the error, then either schedule the
    /// next bounded retry or park in `Failed`.
    async fn fail_attempt(&mut self, context: &str, message: String) {
        warn!(context, %message, attempt = self.attempts + 1, "link attempt failed");
        self.bus.publish(LinkEvent::error(context, message));

        self.attempts += 1;
        if self.attempts >= self.config.max_reconnect_attempts {
            let err = RollmarkError::ReconnectExhausted {
                attempts: self.attempts,
            };
            error!(%err, "link parked; manual restart required");
            self.bus
                .publish(LinkEvent::error("Reconnect exhausted", err.to_string()));
            self.set_state(ConnectionState::Failed);
            self.busy = false;
            return;
        }

        self.set_state(ConnectionState::Recovering);
        self.retry_at = Some(tokio::time::Instant::now() + self.config.retry_interval());
    }

    /// The open succeeded: install a fresh decoder and watchdog, start the
    /// reader thread, and go `Connected`.
    fn on_opened(&mut self, path: String, port: Box<dyn SerialPort>) {
        info!(port = %path, baud = self.config.baud_rate, "scale link connected");
        let shared: SharedPort = Arc::new(Mutex::new(port));
        self.generation += 1;
        let stop = Arc::new(AtomicBool::new(false));
        spawn_reader(
            Arc::clone(&shared),
            self.generation,
            Arc::clone(&stop),
            self.events_tx.clone(),
        );

        self.port = Some(shared);
        self.reader_stop = Some(stop);
        self.current_port = Some(path);
        self.decoder = WeightDecoder::new();
        self.watchdog = Watchdog::new(self.config.stall_timeout());
        self.attempts = 0;
        self.busy = false;
        self.set_state(ConnectionState::Connected);
    }

    async fn handle_reader(&mut self, generation: u64, msg: ReaderMsg) {
        if generation != self.generation {
            return;
        }
        match msg {
            ReaderMsg::Chunk(bytes) => {
                self.watchdog.record_data(Instant::now());
                let port = self.current_port.clone().unwrap_or_default();
                for reading in self.decoder.feed(&bytes, &port, Utc::now()) {
                    self.bus.publish(LinkEvent::UpdateWeight(reading));
                }
            }
            ReaderMsg::Closed(reason) => {
                self.trigger_recovery("Serial port error", reason).await;
            }
        }
    }

    async fn handle_poll(&mut self) {
        match self.watchdog.poll(Instant::now()) {
            WatchdogVerdict::Healthy => {}
            WatchdogVerdict::Probe => {
                let Some(port) = self.port.as_ref().map(Arc::clone) else {
                    return;
                };
                debug!(
                    silence_ms = self.watchdog.silence(Instant::now()).as_millis(),
                    "line silent; sending responsiveness probe"
                );
                let result = tokio::task::spawn_blocking(move || {
                    let mut guard = port
                        .lock()
                        .map_err(|_| "port mutex poisoned".to_string())?;
                    guard
                        .write_all(PROBE)
                        .and_then(|_| guard.flush())
                        .map_err(|e| e.to_string())
                })
                .await;

                let failure = match result {
                    Ok(Ok(())) => None,
                    Ok(Err(detail)) => Some(detail),
                    Err(e) => Some(format!("probe task: {e}")),
                };
                if let Some(detail) = failure {
                    self.trigger_recovery(
                        "Responsiveness probe failed",
                        RollmarkError::WriteFailure(detail).to_string(),
                    )
                    .await;
                }
            }
            WatchdogVerdict::Stalled => {
                let err = RollmarkError::WatchdogStall {
                    elapsed_secs: self.watchdog.silence(Instant::now()).as_secs(),
                };
                self.trigger_recovery("Watchdog stall", err.to_string()).await;
            }
        }
    }

    /// A live connection died (stall, probe failure, read error). Surface
    /// the error first, then enter the bounded recovery cycle.
    async fn trigger_recovery(&mut self, context: &str, message: String) {
        if self.busy {
            debug!(context, "recovery trigger dropped; open sequence in progress");
            return;
        }
        warn!(context, %message, "link lost; recovering");
        self.bus.publish(LinkEvent::error(context, message));
        self.busy = true;
        self.release_connection();
        self.set_state(ConnectionState::Recovering);
        self.retry_at = Some(tokio::time::Instant::now() + self.config.retry_interval());
    }

    /// Drop the port and stop the reader, passing through `Closing` when
    /// the link was up.
    fn release_connection(&mut self) {
        if self.state.is_connected() {
            self.set_state(ConnectionState::Closing);
        }
        self.release_port();
        if self.state == ConnectionState::Closing {
            self.set_state(ConnectionState::Idle);
        }
    }

    fn release_port(&mut self) {
        if let Some(stop) = self.reader_stop.take() {
            stop.store(true, Ordering::Relaxed);
        }
        // Invalidate the old reader immediately: anything it still sends
        // (including its own death notice) must not restart recovery.
        self.generation += 1;
        // The reader thread holds the last clone; the handle closes when it
        // notices the stop flag and exits.
        self.port = None;
        self.current_port = None;
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug!(from = ?self.state, to = ?next, "link state change");
        self.state = next;
        let _ = self.state_tx.send(next);
        self.bus.publish(LinkEvent::SerialStatus {
            connected: next.is_connected(),
            port: if next.is_connected() {
                self.current_port.clone()
            } else {
                None
            },
        });
    }
}

/// Blocking reader thread for one connection. Forwards every chunk to the
/// manager task and reports the reason when the port dies. Exits when the
/// stop flag is set, the port errors, or the manager goes away.
fn spawn_reader(
    port: SharedPort,
    generation: u64,
    stop: Arc<AtomicBool>,
    tx: mpsc::Sender<LoopEvent>,
) {
    std::thread::spawn(move || {
        let mut buf = [0u8; 256];
        let send = |msg: ReaderMsg| {
            tx.blocking_send(LoopEvent::Reader { generation, msg })
                .is_ok()
        };

        loop {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let result = match port.lock() {
                Ok(mut guard) => guard.read(&mut buf),
                Err(_) => {
                    send(ReaderMsg::Closed("port mutex poisoned".into()));
                    return;
                }
            };
            match result {
                Ok(0) => {
                    send(ReaderMsg::Closed("port closed by device".into()));
                    return;
                }
                Ok(n) => {
                    if !send(ReaderMsg::Chunk(buf[..n].to_vec())) {
                        return;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    send(ReaderMsg::Closed(e.to_string()));
                    return;
                }
            }
        }
    });
}
