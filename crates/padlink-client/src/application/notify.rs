//! Notifications emitted by the device link to its observers.
//!
//! The link never calls the UI directly.  Instead it publishes
//! [`LinkNotification`]s on a `tokio::sync::broadcast` channel; any number of
//! observers (the UI bridge, a console logger, tests) subscribe and consume
//! them at their own pace.  A lagging observer misses the oldest
//! notifications (`RecvError::Lagged`); the link itself never waits.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use padlink_core::ButtonEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Connection state of the device link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    /// No live connection and no attempt in flight.
    Disconnected,
    /// A transport connection is being opened.
    Connecting,
    /// The WebSocket handshake completed; button events are flowing.
    Connected,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
        })
    }
}

/// A timestamped log line destined for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub message: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current wall-clock time.
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp_ms: current_timestamp_ms(),
            message: message.into(),
        }
    }
}

/// Everything the link tells its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkNotification {
    /// The link changed state.  `reason` is set for transitions to
    /// `Disconnected` (close reason, failure reason, or user request).
    Status {
        state: LinkState,
        reason: Option<String>,
    },
    /// A human-readable log line.
    Log(LogEntry),
    /// The controller sent a button event.  Forwarded whether or not the
    /// scan code could be translated, so the UI can mirror raw activity.
    ButtonPressed { raw: String, event: ButtonEvent },
}

/// Cloneable publisher for [`LinkNotification`]s.
///
/// Every log helper also emits a `tracing` event at the matching level.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<LinkNotification>,
}

impl Notifier {
    /// Creates a notifier whose channel buffers up to `capacity` notifications
    /// per lagging observer.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes a new observer.  It receives notifications published after
    /// this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LinkNotification> {
        self.tx.subscribe()
    }

    /// Publishes a state change.
    pub fn status(&self, state: LinkState, reason: Option<String>) {
        self.publish(LinkNotification::Status { state, reason });
    }

    /// Publishes a raw button event.
    pub fn button_pressed(&self, raw: String, event: ButtonEvent) {
        self.publish(LinkNotification::ButtonPressed { raw, event });
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.publish(LinkNotification::Log(LogEntry::now(message)));
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.publish(LinkNotification::Log(LogEntry::now(message)));
    }

    pub fn debug(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("{message}");
        self.publish(LinkNotification::Log(LogEntry::now(message)));
    }

    fn publish(&self, notification: LinkNotification) {
        // `send` only fails when nobody is subscribed, which is not an error.
        let _ = self.tx.send(notification);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
