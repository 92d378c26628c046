//! WebSocket client connection and event loop.
//!
//! Each connection attempt spawns a tokio task that:
//!
//! - Performs the client handshake
//! - Forwards inbound frames to the [`EventSink`]
//! - Writes outbound frames queued through the [`WsHandle`]
//! - Reports errors and the final close

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::monitor::Endpoint;

use super::{ConnectionHandle, EventSink, Transport, TransportEvent};

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a text frame.
    Send(String),
    /// Close the connection.
    Shutdown,
}

// ============================================================================
// WsTransport
// ============================================================================

/// Transport backed by `tokio-tungstenite`.
///
/// [`Transport::connect`] must be called from within a Tokio runtime.
pub struct WsTransport {
    /// Receives every event of every attempt.
    sink: EventSink,
}

impl WsTransport {
    /// Creates a transport reporting to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl Transport for WsTransport {
    type Handle = WsHandle;

    fn connect(&mut self, id: ConnectionId, endpoint: &Endpoint) -> Result<WsHandle> {
        let url = endpoint.url().clone();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::runtime::Handle::try_current()
            .map_err(|e| Error::connection(format!("no Tokio runtime: {e}")))?
            .spawn(run_event_loop(id, url, command_rx, self.sink.clone()));

        debug!(connection_id = %id, endpoint = %endpoint, "Connection task spawned");

        Ok(WsHandle { id, command_tx })
    }
}

// ============================================================================
// WsHandle
// ============================================================================

/// Handle to a running connection task.
///
/// Dropping it closes the command channel, which shuts the task down.
pub struct WsHandle {
    /// Attempt this handle controls.
    id: ConnectionId,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl WsHandle {
    /// Returns the attempt id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl ConnectionHandle for WsHandle {
    fn send(&self, text: String) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Send(text))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Drives one connection from handshake to close.
///
/// Always ends by emitting [`TransportEvent::Closed`].
async fn run_event_loop(
    id: ConnectionId,
    url: Url,
    mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    sink: EventSink,
) {
    let ws_stream = tokio::select! {
        connected = connect_async(url.as_str()) => match connected {
            Ok((stream, _response)) => stream,
            Err(e) => {
                sink(TransportEvent::Failed(id, e.to_string()));
                sink(TransportEvent::Closed(id));
                return;
            }
        },

        // Handle dropped or closed before the handshake finished
        _ = wait_for_shutdown(&mut command_rx) => {
            debug!(connection_id = %id, "Connection abandoned during handshake");
            sink(TransportEvent::Closed(id));
            return;
        }
    };

    sink(TransportEvent::Opened(id));

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            // Incoming frames from the service
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        sink(TransportEvent::Frame(id, text.as_str().to_owned()));
                    }

                    Some(Ok(Message::Binary(bytes))) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        sink(TransportEvent::Frame(id, text));
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!(connection_id = %id, "WebSocket closed by remote");
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(connection_id = %id, error = %e, "WebSocket error");
                        sink(TransportEvent::Failed(id, e.to_string()));
                        break;
                    }

                    None => {
                        debug!(connection_id = %id, "WebSocket stream ended");
                        break;
                    }

                    // Ignore Ping, Pong, Frame
                    _ => {}
                }
            }

            // Commands from the manager
            command = command_rx.recv() => {
                match command {
                    Some(ConnectionCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(connection_id = %id, error = %e, "Failed to send frame");
                            sink(TransportEvent::Failed(id, e.to_string()));
                            break;
                        }
                        trace!(connection_id = %id, "Frame sent");
                    }

                    Some(ConnectionCommand::Shutdown) => {
                        debug!(connection_id = %id, "Shutdown command received");
                        let _ = ws_write.close().await;
                        break;
                    }

                    None => {
                        debug!(connection_id = %id, "Handle dropped");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    sink(TransportEvent::Closed(id));
    debug!(connection_id = %id, "Event loop terminated");
}

/// Resolves once the handle asks for shutdown or is dropped.
///
/// Frames queued before the handshake are discarded.
async fn wait_for_shutdown(command_rx: &mut mpsc::UnboundedReceiver<ConnectionCommand>) {
    while let Some(command) = command_rx.recv().await {
        if matches!(command, ConnectionCommand::Shutdown) {
            return;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
