//! WebSocket link to the touch-panel controller.
//!
//! Architecture:
//! - [`DeviceLink::spawn`] starts a single session task that owns all link
//!   state (connection state, attempt counter, timers).
//! - Every input to that task (user commands, connect results, inbound
//!   frames, keepalive ticks, reconnect timers) arrives on one `mpsc`
//!   queue, so transitions are applied one at a time in arrival order.
//! - The socket itself sits behind the [`Connector`] trait.  Production uses
//!   [`WsConnector`]; tests drive the session with a scripted fake.
//! - Observers learn about state changes, log lines and button events from
//!   the [`Notifier`](crate::application::notify::Notifier).

mod session;
mod transport;

pub use session::{DeviceLink, LinkHandle, LinkSnapshot};
pub use transport::{Connector, FrameSink, FrameStream, Transport, TransportEvent, WsConnector};

use std::time::Duration;

use thiserror::Error;

use crate::application::backoff::BackoffPolicy;

/// TCP port the controller's WebSocket server listens on.
pub const CONTROLLER_PORT: u16 = 8081;

/// Errors that can occur in the link layer.
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    /// The TCP connection or WebSocket upgrade failed.
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    /// The handshake did not finish in time.
    #[error("handshake with {url} timed out after {timeout:?}")]
    HandshakeTimeout { url: String, timeout: Duration },
    /// A frame could not be written to the established connection.
    #[error("send failed: {0}")]
    Send(String),
    /// The session task is no longer running.
    #[error("link session has stopped")]
    Stopped,
}

/// Address of the controller's WebSocket endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// An endpoint on the standard controller port.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: CONTROLLER_PORT,
        }
    }

    /// The `ws://` URL for this endpoint.  Bare IPv6 literals are bracketed.
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ws://[{}]:{}", self.host, self.port)
        } else {
            format!("ws://{}:{}", self.host, self.port)
        }
    }
}

/// Source of the endpoint to dial.
///
/// Read at the start of every connection attempt, so a changed controller
/// address takes effect on the next attempt without restarting the link.
pub trait EndpointProvider: Send + Sync {
    fn endpoint(&self) -> Endpoint;
}

impl EndpointProvider for Endpoint {
    fn endpoint(&self) -> Endpoint {
        self.clone()
    }
}

/// Timing parameters of the link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Upper bound on TCP connect plus WebSocket upgrade.
    pub handshake_timeout: Duration,
    /// Period between keepalive pings while connected.
    pub keepalive_interval: Duration,
    /// Reconnect delay curve.
    pub backoff: BackoffPolicy,
    /// Combinations that may wait for the injector before new ones are dropped.
    pub injection_queue_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(15),
            backoff: BackoffPolicy::default(),
            injection_queue_capacity: 64,
        }
    }
}
