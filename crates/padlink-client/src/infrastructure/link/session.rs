//! The link session task.
//!
//! ```text
//!              connect()                  handshake ok
//! Disconnected ─────────▶ Connecting ───────────────────▶ Connected
//!      ▲  ▲                   │                              │
//!      │  └── failure/timeout ┘          close / error /     │
//!      │      (schedule retry)           keepalive lost      │
//!      └──────────────────────────────── (schedule retry) ───┘
//! ```
//!
//! `disconnect()` from any state moves to `Disconnected` and cancels every
//! pending retry.  Timers and background tasks carry the `epoch` they were
//! created in; an event from an older epoch is ignored.
//!
//! Only [`LinkHandle`]s own the event queue.  The session and its background
//! tasks post through weak senders, so the task ends once every handle is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, timeout, MissedTickBehavior};
use tracing::debug;

use super::transport::{Connector, FrameSink, Transport, TransportEvent};
use super::{EndpointProvider, LinkConfig, LinkError};
use crate::application::dispatch::{classify_frame, FrameAction, InjectionQueue, KeyInjector};
use crate::application::notify::{LinkState, Notifier};

/// Observable summary of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSnapshot {
    pub state: LinkState,
    /// Connection attempts since the last successful connection.
    pub attempts: u32,
}

/// Everything the session task reacts to.
#[derive(Debug)]
enum LinkEvent {
    Connect,
    Disconnect,
    Shutdown,
    Established { epoch: u64, transport: Transport },
    ConnectFailed { epoch: u64, error: LinkError },
    Inbound { epoch: u64, event: TransportEvent },
    KeepaliveTick { epoch: u64 },
    ReconnectDue { epoch: u64 },
}

/// Cloneable control handle for a running link.
#[derive(Clone)]
pub struct LinkHandle {
    tx: mpsc::Sender<LinkEvent>,
    snapshot: watch::Receiver<LinkSnapshot>,
}

impl LinkHandle {
    /// Requests a connection.  Ignored unless the link is disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Stopped`] if the session task has exited.
    pub async fn connect(&self) -> Result<(), LinkError> {
        self.send(LinkEvent::Connect).await
    }

    /// Closes the connection (or abandons the attempt in progress) and
    /// cancels any scheduled reconnect.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Stopped`] if the session task has exited.
    pub async fn disconnect(&self) -> Result<(), LinkError> {
        self.send(LinkEvent::Disconnect).await
    }

    /// Disconnects and stops the session task.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Stopped`] if the session task has already exited.
    pub async fn shutdown(&self) -> Result<(), LinkError> {
        self.send(LinkEvent::Shutdown).await
    }

    /// Current connection state.
    pub fn state(&self) -> LinkState {
        self.snapshot.borrow().state
    }

    /// Current state and attempt counter.
    pub fn snapshot(&self) -> LinkSnapshot {
        *self.snapshot.borrow()
    }

    /// A receiver that observes every snapshot change.
    pub fn watch(&self) -> watch::Receiver<LinkSnapshot> {
        self.snapshot.clone()
    }

    async fn send(&self, event: LinkEvent) -> Result<(), LinkError> {
        self.tx.send(event).await.map_err(|_| LinkError::Stopped)
    }
}

/// Entry point for starting a link.
pub struct DeviceLink;

impl DeviceLink {
    /// Spawns the session task and its injection worker on the current Tokio
    /// runtime.  The link starts `Disconnected`; call
    /// [`LinkHandle::connect`] to dial.
    pub fn spawn(
        config: LinkConfig,
        connector: Arc<dyn Connector>,
        endpoint: Arc<dyn EndpointProvider>,
        injector: Arc<dyn KeyInjector>,
        notifier: Notifier,
    ) -> (LinkHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(128);
        let initial = LinkSnapshot {
            state: LinkState::Disconnected,
            attempts: 0,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let injection =
            InjectionQueue::spawn(injector, notifier.clone(), config.injection_queue_capacity);

        let session = LinkSession {
            config,
            connector,
            endpoint,
            notifier,
            injection,
            events: tx.downgrade(),
            snapshot: snapshot_tx,
            state: LinkState::Disconnected,
            attempts: 0,
            attempts_before_current: 0,
            epoch: 0,
            sink: None,
            awaiting_pong: false,
            connect_task: None,
            reader_task: None,
            keepalive_task: None,
            reconnect_task: None,
        };
        let task = tokio::spawn(session.run(rx));

        let handle = LinkHandle {
            tx,
            snapshot: snapshot_rx,
        };
        (handle, task)
    }
}

struct LinkSession {
    config: LinkConfig,
    connector: Arc<dyn Connector>,
    endpoint: Arc<dyn EndpointProvider>,
    notifier: Notifier,
    injection: InjectionQueue,
    events: mpsc::WeakSender<LinkEvent>,
    snapshot: watch::Sender<LinkSnapshot>,

    state: LinkState,
    /// Attempts since the last successful connection, including the one in
    /// flight.
    attempts: u32,
    /// Value of `attempts` before the in-flight attempt was counted.
    attempts_before_current: u32,
    epoch: u64,
    sink: Option<Box<dyn FrameSink>>,
    awaiting_pong: bool,

    connect_task: Option<JoinHandle<()>>,
    reader_task: Option<JoinHandle<()>>,
    keepalive_task: Option<JoinHandle<()>>,
    reconnect_task: Option<JoinHandle<()>>,
}

impl LinkSession {
    async fn run(mut self, mut rx: mpsc::Receiver<LinkEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                LinkEvent::Connect => self.on_connect_requested(),
                LinkEvent::Disconnect => self.on_disconnect_requested(),
                LinkEvent::Shutdown => {
                    self.on_disconnect_requested();
                    break;
                }
                LinkEvent::Established { epoch, transport } => {
                    self.on_established(epoch, transport)
                }
                LinkEvent::ConnectFailed { epoch, error } => self.on_connect_failed(epoch, error),
                LinkEvent::Inbound { epoch, event } => self.on_inbound(epoch, event),
                LinkEvent::KeepaliveTick { epoch } => self.on_keepalive_tick(epoch).await,
                LinkEvent::ReconnectDue { epoch } => self.on_reconnect_due(epoch),
            }
        }

        if let Some(sink) = self.sink.take() {
            self.close_in_background(sink);
        }
        for task in [
            self.connect_task.take(),
            self.reader_task.take(),
            self.keepalive_task.take(),
            self.reconnect_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
        debug!("link session stopped");
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    fn on_connect_requested(&mut self) {
        if self.state != LinkState::Disconnected {
            debug!("connect request ignored while {}", self.state);
            return;
        }
        self.begin_attempt();
    }

    fn on_disconnect_requested(&mut self) {
        let had_pending_retry = self.cancel_reconnect();
        match self.state {
            LinkState::Disconnected => {
                // A retry timer may already have queued its event.
                self.epoch += 1;
                if had_pending_retry {
                    self.notifier.info("pending reconnect cancelled");
                }
                return;
            }
            LinkState::Connecting => {
                if let Some(task) = self.connect_task.take() {
                    task.abort();
                }
            }
            LinkState::Connected => {
                self.stop_connection_tasks();
                if let Some(sink) = self.sink.take() {
                    self.close_in_background(sink);
                }
            }
        }
        self.notifier.info("disconnected by user");
        self.enter_disconnected(Some("disconnected by user".to_string()));
    }

    // ── Connection lifecycle ──────────────────────────────────────────────────

    fn begin_attempt(&mut self) {
        self.cancel_reconnect();
        self.epoch += 1;
        self.attempts_before_current = self.attempts;
        self.attempts = self.attempts.saturating_add(1);

        let url = self.endpoint.endpoint().url();
        self.set_state(LinkState::Connecting, None);
        self.notifier
            .info(format!("connecting to {url} (attempt {})", self.attempts));

        let connector = Arc::clone(&self.connector);
        let events = self.events.clone();
        let epoch = self.epoch;
        let limit = self.config.handshake_timeout;
        self.connect_task = Some(tokio::spawn(async move {
            let result = timeout(limit, connector.connect(&url)).await;
            let event = match result {
                Ok(Ok(transport)) => LinkEvent::Established { epoch, transport },
                Ok(Err(error)) => LinkEvent::ConnectFailed { epoch, error },
                Err(_) => LinkEvent::ConnectFailed {
                    epoch,
                    error: LinkError::HandshakeTimeout {
                        url,
                        timeout: limit,
                    },
                },
            };
            post(&events, event).await;
        }));
    }

    fn on_established(&mut self, epoch: u64, transport: Transport) {
        if epoch != self.epoch || self.state != LinkState::Connecting {
            debug!(epoch, "discarding connection from an abandoned attempt");
            self.close_in_background(transport.sink);
            return;
        }

        self.connect_task = None;
        self.attempts = 0;
        self.awaiting_pong = false;

        let Transport { sink, mut stream } = transport;
        self.sink = Some(sink);

        let events = self.events.clone();
        self.reader_task = Some(tokio::spawn(async move {
            loop {
                let event = stream.next_event().await;
                let closed = matches!(event, TransportEvent::Closed { .. });
                if !post(&events, LinkEvent::Inbound { epoch, event }).await || closed {
                    break;
                }
            }
        }));
        self.start_keepalive();

        self.set_state(LinkState::Connected, None);
        self.notifier.info("connected to controller");
    }

    fn on_connect_failed(&mut self, epoch: u64, error: LinkError) {
        if epoch != self.epoch || self.state != LinkState::Connecting {
            return;
        }
        self.connect_task = None;
        self.notifier
            .warn(format!("connection attempt failed: {error}"));
        self.enter_disconnected(Some(error.to_string()));
        self.schedule_reconnect(self.attempts_before_current);
    }

    fn on_connection_lost(&mut self, reason: String) {
        self.stop_connection_tasks();
        if let Some(sink) = self.sink.take() {
            self.close_in_background(sink);
        }
        self.notifier
            .warn(format!("disconnected from controller: {reason}"));
        self.enter_disconnected(Some(reason));
        // The counter was reset when the connection was established.
        self.schedule_reconnect(self.attempts);
    }

    fn on_reconnect_due(&mut self, epoch: u64) {
        if epoch != self.epoch || self.state != LinkState::Disconnected {
            return;
        }
        self.reconnect_task = None;
        self.begin_attempt();
    }

    // ── Inbound traffic ───────────────────────────────────────────────────────

    fn on_inbound(&mut self, epoch: u64, event: TransportEvent) {
        if epoch != self.epoch || self.state != LinkState::Connected {
            return;
        }
        match event {
            TransportEvent::Text(text) => self.on_text_frame(text),
            TransportEvent::Binary(len) => debug!(len, "ignoring binary frame"),
            TransportEvent::Pong => self.awaiting_pong = false,
            TransportEvent::Closed { reason } => self.on_connection_lost(reason),
        }
    }

    fn on_text_frame(&self, text: String) {
        self.notifier.debug(format!("received: {text}"));
        match classify_frame(&text) {
            FrameAction::Press { event, combo } => {
                self.notifier.button_pressed(text, event);
                match combo {
                    Ok(combo) => {
                        self.notifier
                            .info(format!("button {:#04x} mapped to {combo}", event.key));
                        if !self.injection.submit(combo) {
                            self.notifier
                                .warn("injection queue is full; dropping key press");
                        }
                    }
                    Err(e) => self.notifier.warn(format!("dropping button event: {e}")),
                }
            }
            FrameAction::Ignore { type_name } => debug!(type_name, "ignoring message"),
            FrameAction::Malformed(e) => {
                self.notifier.warn(format!("could not parse message: {e}"))
            }
        }
    }

    // ── Keepalive ─────────────────────────────────────────────────────────────

    fn start_keepalive(&mut self) {
        let period = self.config.keepalive_interval.max(Duration::from_millis(1));
        let events = self.events.clone();
        let epoch = self.epoch;
        self.keepalive_task = Some(tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                if !post(&events, LinkEvent::KeepaliveTick { epoch }).await {
                    break;
                }
            }
        }));
    }

    async fn on_keepalive_tick(&mut self, epoch: u64) {
        if epoch != self.epoch || self.state != LinkState::Connected {
            return;
        }
        if self.awaiting_pong {
            self.on_connection_lost("keepalive probe unanswered".to_string());
            return;
        }
        let limit = self.config.handshake_timeout;
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let result = timeout(limit, sink.ping()).await;
        match result {
            Ok(Ok(())) => self.awaiting_pong = true,
            Ok(Err(e)) => self.on_connection_lost(e.to_string()),
            Err(_) => self.on_connection_lost("keepalive ping timed out".to_string()),
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn enter_disconnected(&mut self, reason: Option<String>) {
        self.epoch += 1;
        self.awaiting_pong = false;
        self.set_state(LinkState::Disconnected, reason);
    }

    fn schedule_reconnect(&mut self, attempts: u32) {
        self.cancel_reconnect();
        let delay = self.config.backoff.delay_for(attempts);
        self.notifier
            .info(format!("reconnecting in {:.1} s", delay.as_secs_f64()));

        let events = self.events.clone();
        let epoch = self.epoch;
        self.reconnect_task = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            post(&events, LinkEvent::ReconnectDue { epoch }).await;
        }));
    }

    /// Returns `true` if a retry was pending.
    fn cancel_reconnect(&mut self) -> bool {
        match self.reconnect_task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn stop_connection_tasks(&mut self) {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        if let Some(task) = self.keepalive_task.take() {
            task.abort();
        }
    }

    fn close_in_background(&self, mut sink: Box<dyn FrameSink>) {
        let limit = self.config.handshake_timeout;
        tokio::spawn(async move {
            let _ = timeout(limit, sink.close()).await;
        });
    }

    fn set_state(&mut self, state: LinkState, reason: Option<String>) {
        self.state = state;
        self.snapshot.send_replace(LinkSnapshot {
            state,
            attempts: self.attempts,
        });
        self.notifier.status(state, reason);
    }
}

/// Queues `event` for the session.  Returns `false` once the session is gone.
async fn post(events: &mpsc::WeakSender<LinkEvent>, event: LinkEvent) -> bool {
    match events.upgrade() {
        Some(tx) => tx.send(event).await.is_ok(),
        None => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
