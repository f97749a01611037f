//! Transport seam between the link session and the socket.
//!
//! The session only needs three things from a connection: read the next
//! event, send a ping, and close.  [`Connector::connect`] returns those as a
//! split [`Transport`] so the read half can live in its own task while the
//! session keeps the write half.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

use super::LinkError;

/// One event read from an established connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame.
    Text(String),
    /// A binary frame of the given length.  The controller never sends these.
    Binary(usize),
    /// The answer to one of our pings.
    Pong,
    /// The connection is gone.  No further events follow.
    Closed { reason: String },
}

/// Read half of a connection.
#[async_trait]
pub trait FrameStream: Send {
    /// Waits for the next event.  Returns [`TransportEvent::Closed`] once the
    /// connection ends; must not be called again afterwards.
    async fn next_event(&mut self) -> TransportEvent;
}

/// Write half of a connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends a ping control frame.
    async fn ping(&mut self) -> Result<(), LinkError>;

    /// Starts the closing handshake.  Errors are ignored; the connection is
    /// being abandoned either way.
    async fn close(&mut self);
}

/// An established connection, split into halves.
pub struct Transport {
    pub sink: Box<dyn FrameSink>,
    pub stream: Box<dyn FrameStream>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

/// Opens connections to the controller.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Performs the TCP connect and WebSocket upgrade for `url`.
    ///
    /// The caller bounds this with its own handshake timeout.
    async fn connect(&self, url: &str) -> Result<Transport, LinkError>;
}

// ── tokio-tungstenite implementation ─────────────────────────────────────────

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`Connector`] backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Transport, LinkError> {
        let (ws_stream, response) = connect_async(url).await.map_err(|e| LinkError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(status = %response.status(), "websocket upgrade complete for {url}");

        let (sink, stream) = ws_stream.split();
        Ok(Transport {
            sink: Box::new(WsFrameSink { inner: sink }),
            stream: Box::new(WsFrameStream { inner: stream }),
        })
    }
}

struct WsFrameSink {
    inner: SplitSink<WsStream, WsMessage>,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn ping(&mut self) -> Result<(), LinkError> {
        self.inner
            .send(WsMessage::Ping(Vec::new()))
            .await
            .map_err(|e| LinkError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.inner.close().await {
            debug!("error while closing websocket: {e}");
        }
    }
}

struct WsFrameStream {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl FrameStream for WsFrameStream {
    async fn next_event(&mut self) -> TransportEvent {
        loop {
            let reason = match self.inner.next().await {
                Some(Ok(WsMessage::Text(text))) => return TransportEvent::Text(text),
                Some(Ok(WsMessage::Binary(data))) => return TransportEvent::Binary(data.len()),
                Some(Ok(WsMessage::Pong(_))) => return TransportEvent::Pong,
                // tungstenite answers pings itself.
                Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Frame(_))) => continue,
                Some(Ok(WsMessage::Close(Some(frame)))) => {
                    format!("closed by controller ({}: {})", u16::from(frame.code), frame.reason)
                }
                Some(Ok(WsMessage::Close(None))) => "closed by controller".to_string(),
                Some(Err(e)) => format!("websocket error: {e}"),
                None => "connection ended".to_string(),
            };
            return TransportEvent::Closed { reason };
        }
    }
}
