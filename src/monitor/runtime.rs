//! Monitor runtime.
//!
//! [`Monitor`] runs a [`ConnectionManager`] on a single Tokio task. Transport
//! events, reconnect timer shots, and caller requests all go through one
//! queue, so the manager sees them strictly one at a time and never needs a
//! lock.
//!
//! ```text
//! WsTransport tasks ──Transport──┐
//! TokioTimer        ──Reconnect──┼──► event queue ──► ConnectionManager ──► Document
//! Monitor handle    ──Send/Stop──┘                           │
//!                                                            ▼
//!                                                   watch<ConnectionState>
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identifiers::ElementId;
use crate::surface::{Document, SEND_ATTR};
use crate::transport::{EventSink, Transport, TransportEvent, WsTransport};

use super::builder::MonitorBuilder;
use super::manager::ConnectionManager;
use super::options::MonitorOptions;
use super::state::ConnectionState;
use super::timer::{ReconnectTimer, TokioTimer, saturating_millis};

// ============================================================================
// MonitorEvent
// ============================================================================

/// Everything the monitor task reacts to.
enum MonitorEvent {
    /// Lifecycle or data event from a connection task.
    Transport(TransportEvent),
    /// The reconnect timer fired.
    ReconnectDue,
    /// Outbound payload from the handle.
    Send {
        payload: Value,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Tear down and exit.
    Shutdown,
}

// ============================================================================
// Monitor
// ============================================================================

/// Handle to a running connection monitor.
///
/// Dropping the handle tears the monitor down: the pending reconnect is
/// cancelled and the connection is closed.
pub struct Monitor {
    event_tx: mpsc::UnboundedSender<MonitorEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    /// Spawns a monitor rendering into `document` and starts connecting.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options fail [`MonitorOptions::validate`]
    /// - [`Error::Config`] if called outside a Tokio runtime
    pub fn spawn<D>(options: MonitorOptions, document: D) -> Result<Self>
    where
        D: Document + Send + 'static,
    {
        options.validate()?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::config(format!("Monitor requires a Tokio runtime: {e}")))?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);

        let sink_tx = event_tx.clone();
        let sink: EventSink = Arc::new(move |event| {
            let _ = sink_tx.send(MonitorEvent::Transport(event));
        });

        let timer_tx = event_tx.clone();
        let timer = TokioTimer::new(Arc::new(move || {
            let _ = timer_tx.send(MonitorEvent::ReconnectDue);
        }));

        info!(
            origin = %options.origin,
            service_port = options.service_port,
            reconnect_delay_ms = saturating_millis(options.reconnect_delay),
            "Starting monitor"
        );

        let manager = ConnectionManager::new(options, WsTransport::new(sink), timer, document);
        let task = runtime.spawn(run_monitor(manager, event_rx, state_tx));

        Ok(Self {
            event_tx,
            state_rx,
            task: Some(task),
        })
    }

    /// Returns the last published state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Waits until the monitor reaches `state`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the state is not reached in time
    /// - [`Error::ConnectionClosed`] if the monitor task has exited
    pub async fn wait_for_state(&self, state: ConnectionState, timeout: Duration) -> Result<()> {
        let mut state_rx = self.state_rx.clone();

        tokio::time::timeout(timeout, state_rx.wait_for(|current| *current == state))
            .await
            .map_err(|_| {
                Error::timeout(format!("waiting for state {state}"), saturating_millis(timeout))
            })?
            .map_err(|_| Error::ConnectionClosed)?;

        Ok(())
    }

    /// Sends a JSON payload to the service.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] unless the connection is open
    /// - [`Error::ConnectionClosed`] if the monitor or connection has exited
    pub async fn send(&self, payload: Value) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();

        self.event_tx
            .send(MonitorEvent::Send { payload, reply })
            .map_err(|_| Error::ConnectionClosed)?;

        reply_rx.await?
    }

    /// Sends the payload declared on an element's `data-tws-send` attribute.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the element is gone or carries no payload
    /// - [`Error::Json`] if the payload is not JSON
    /// - Any error from [`send`](Self::send)
    pub async fn send_element<D>(&self, document: &mut D, id: ElementId) -> Result<()>
    where
        D: Document + ?Sized,
    {
        let payload = document
            .send_payload(id)
            .ok_or_else(|| Error::config(format!("element {id} has no {SEND_ATTR} payload")))?;
        let payload: Value = serde_json::from_str(&payload)?;

        self.send(payload).await
    }

    /// Tears the monitor down and waits for its task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.event_tx.send(MonitorEvent::Shutdown);

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("state", &self.state())
            .field("running", &self.task.as_ref().is_some_and(|task| !task.is_finished()))
            .finish()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.event_tx.send(MonitorEvent::Shutdown);
        }
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Owns the manager and applies queued events until shutdown.
async fn run_monitor<T, R, D>(
    mut manager: ConnectionManager<T, R, D>,
    mut event_rx: mpsc::UnboundedReceiver<MonitorEvent>,
    state_tx: watch::Sender<ConnectionState>,
) where
    T: Transport,
    R: ReconnectTimer,
    D: Document,
{
    manager.start();
    publish(&state_tx, manager.state());

    while let Some(event) = event_rx.recv().await {
        match event {
            MonitorEvent::Transport(event) => manager.handle_event(event),

            MonitorEvent::ReconnectDue => manager.on_reconnect_due(),

            MonitorEvent::Send { payload, reply } => {
                let _ = reply.send(manager.send(&payload));
            }

            MonitorEvent::Shutdown => {
                manager.shutdown();
                publish(&state_tx, manager.state());
                break;
            }
        }

        publish(&state_tx, manager.state());
    }

    debug!("Monitor task terminated");
}

/// Publishes `state` if it changed.
fn publish(state_tx: &watch::Sender<ConnectionState>, state: ConnectionState) {
    state_tx.send_if_modified(|current| {
        if *current == state {
            return false;
        }
        *current = state;
        true
    });
}

// ============================================================================
// Tests
// ============================================================================
