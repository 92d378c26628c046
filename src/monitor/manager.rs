//! Connection lifecycle state machine.
//!
//! The [`ConnectionManager`] owns the single connection, the reconnect timer
//! flag, and the cached endpoint. It is driven entirely by method calls:
//!
//! | Input | Transition |
//! |-------|------------|
//! | [`start`](ConnectionManager::start) | Idle/Closed → Connecting |
//! | [`TransportEvent::Opened`] | Connecting → Open |
//! | [`TransportEvent::Frame`] | Open → Open (frame routed to widgets) |
//! | [`TransportEvent::Failed`] | Connecting/Open → Closed (connection closed actively) |
//! | [`TransportEvent::Closed`] | Connecting/Open → Closed |
//! | [`on_reconnect_due`](ConnectionManager::on_reconnect_due) | Closed → Connecting |
//!
//! Every entry into Closed updates the status surfaces, discards the
//! connection handle, and arms the reconnect timer unless it is already
//! pending. Events tagged with any id other than the live connection's are
//! ignored, so a late close from a discarded connection cannot trigger a
//! second timer.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::to_string;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::router::MessageRouter;
use crate::surface::{Document, StatusSink};
use crate::transport::{ConnectionHandle, Transport, TransportEvent};

use super::endpoint::Endpoint;
use super::options::MonitorOptions;
use super::state::ConnectionState;
use super::timer::{ReconnectTimer, saturating_millis};

// ============================================================================
// ActiveConnection
// ============================================================================

/// The live connection attempt.
struct ActiveConnection<H> {
    id: ConnectionId,
    handle: H,
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the connection lifecycle and reconnect policy.
///
/// Generic over the transport, the reconnect timer, and the document so the
/// state machine can be driven with synthetic events in tests.
pub struct ConnectionManager<T: Transport, R: ReconnectTimer, D: Document> {
    options: MonitorOptions,
    transport: T,
    timer: R,
    document: D,
    state: ConnectionState,
    /// Resolved on first start, then reused.
    endpoint: Option<Endpoint>,
    active: Option<ActiveConnection<T::Handle>>,
    last_id: ConnectionId,
    reconnect_pending: bool,
}

impl<T: Transport, R: ReconnectTimer, D: Document> ConnectionManager<T, R, D> {
    /// Creates an idle manager.
    pub fn new(options: MonitorOptions, transport: T, timer: R, document: D) -> Self {
        Self {
            options,
            transport,
            timer,
            document,
            state: ConnectionState::Idle,
            endpoint: None,
            active: None,
            last_id: ConnectionId::new(0),
            reconnect_pending: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the cached endpoint, if resolved.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Returns the id of the live connection attempt.
    #[inline]
    #[must_use]
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Returns `true` while the reconnect timer is armed.
    #[inline]
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Returns the document.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Returns the document mutably.
    #[inline]
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Starts a connection attempt unless one is live.
    ///
    /// A no-op while Connecting or Open. If the attempt cannot be started,
    /// the manager goes straight to Closed and schedules a reconnect.
    pub fn start(&mut self) {
        if self.state.is_live() {
            debug!(state = %self.state, "Start ignored, connection already live");
            return;
        }

        let endpoint = match self.resolve_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(error = %e, "Cannot resolve service endpoint");
                self.disconnect();
                return;
            }
        };

        let id = self.last_id.next();
        self.last_id = id;
        self.state = ConnectionState::Connecting;

        match self.transport.connect(id, &endpoint) {
            Ok(handle) => {
                self.active = Some(ActiveConnection { id, handle });
                debug!(connection_id = %id, endpoint = %endpoint, "Connecting");
            }
            Err(e) => {
                warn!(connection_id = %id, error = %e, "Failed to start connection");
                self.disconnect();
            }
        }
    }

    /// Applies a transport event.
    ///
    /// Events from any connection other than the live one are ignored.
    pub fn handle_event(&mut self, event: TransportEvent) {
        let id = event.connection_id();
        if self.connection_id() != Some(id) {
            trace!(connection_id = %id, "Ignoring event from stale connection");
            return;
        }

        match event {
            TransportEvent::Opened(_) => self.on_open(),
            TransportEvent::Frame(_, raw) => self.on_frame(&raw),
            TransportEvent::Failed(_, reason) => self.on_error(&reason),
            TransportEvent::Closed(_) => self.on_close(),
        }
    }

    /// Handles the reconnect timer firing.
    ///
    /// Clears the pending flag before starting, so the attempt is never
    /// suppressed by the timer it came from.
    pub fn on_reconnect_due(&mut self) {
        if !self.reconnect_pending {
            trace!("Ignoring reconnect with no pending timer");
            return;
        }

        self.reconnect_pending = false;
        debug!("Reconnect timer fired");
        self.start();
    }

    /// Sends a JSON payload on the open connection.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] unless the connection is open
    /// - [`Error::Json`] if the payload does not serialize
    /// - [`Error::ConnectionClosed`] if the connection task has exited
    pub fn send<S: Serialize + ?Sized>(&mut self, payload: &S) -> Result<()> {
        let active = match (&self.active, self.state) {
            (Some(active), ConnectionState::Open) => active,
            _ => return Err(Error::not_connected(self.state)),
        };

        let text = to_string(payload)?;
        trace!(connection_id = %active.id, bytes = text.len(), "Queueing outbound frame");
        active.handle.send(text)
    }

    /// Tears the monitor down: cancels any pending reconnect and closes the
    /// connection. No reconnect is scheduled afterwards.
    pub fn shutdown(&mut self) {
        self.timer.cancel();
        self.reconnect_pending = false;

        if let Some(active) = self.active.take() {
            active.handle.close();
        }

        if self.state.is_live() {
            self.state = ConnectionState::Closed;
            StatusSink::set_online(&mut self.document, false);
        }

        info!("Monitor shut down");
    }

    fn on_open(&mut self) {
        self.state = ConnectionState::Open;
        StatusSink::set_online(&mut self.document, true);

        if let (Some(id), Some(endpoint)) = (self.connection_id(), &self.endpoint) {
            info!(connection_id = %id, endpoint = %endpoint, "Connection established");
        }
    }

    fn on_frame(&mut self, raw: &str) {
        if !self.state.is_open() {
            trace!(state = %self.state, "Ignoring frame before open");
            return;
        }

        MessageRouter::handle_frame(&mut self.document, raw);
    }

    fn on_error(&mut self, reason: &str) {
        warn!(reason, "Transport error, closing connection");

        if let Some(active) = &self.active {
            active.handle.close();
        }

        self.on_close();
    }

    fn on_close(&mut self) {
        self.disconnect();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Enters Closed: discards the handle, reports offline, schedules a
    /// reconnect.
    fn disconnect(&mut self) {
        let previous = self.state;

        if let Some(active) = self.active.take() {
            info!(connection_id = %active.id, previous = %previous, "Connection lost");
        }

        self.state = ConnectionState::Closed;
        StatusSink::set_online(&mut self.document, false);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect_pending {
            debug!("Reconnect already pending");
            return;
        }

        let delay = self.options.reconnect_delay;
        self.timer.arm(delay);
        self.reconnect_pending = true;

        debug!(delay_ms = saturating_millis(delay), "Reconnect scheduled");
    }

    fn resolve_endpoint(&mut self) -> Result<Endpoint> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }

        let endpoint = self.options.endpoint()?;
        self.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }
}

// ============================================================================
// Tests
// ============================================================================
