//! WebSocket transport layer.
//!
//! The connection manager never touches sockets directly. It asks a
//! [`Transport`] to start a connection attempt and receives a
//! [`ConnectionHandle`] back; everything that happens afterwards arrives as
//! [`TransportEvent`]s tagged with the attempt's [`ConnectionId`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐                         ┌─────────────────┐
//! │  ConnectionManager  │                         │  Local service  │
//! │                     │        WebSocket        │                 │
//! │  WsTransport        │◄───────────────────────►│  WebSocket      │
//! │  → WsHandle         │     host:SERVICE_PORT   │  server         │
//! │                     │                         │                 │
//! └─────────────────────┘                         └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Transport::connect` - Spawn a connection task, return its handle
//! 2. `TransportEvent::Opened` - Handshake finished
//! 3. `TransportEvent::Frame` - One per inbound text or binary message
//! 4. `TransportEvent::Failed` - Transport error (a close always follows)
//! 5. `TransportEvent::Closed` - Connection gone; the task has exited
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | tokio-tungstenite client and its event loop |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::error::Result;
use crate::identifiers::ConnectionId;
use crate::monitor::Endpoint;

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket client connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{WsHandle, WsTransport};

// ============================================================================
// Types
// ============================================================================

/// Callback receiving transport events.
///
/// Called from the connection task; implementations should only enqueue.
pub type EventSink = Arc<dyn Fn(TransportEvent) + Send + Sync>;

// ============================================================================
// TransportEvent
// ============================================================================

/// Lifecycle and data events of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed.
    Opened(ConnectionId),
    /// Inbound frame, as text.
    Frame(ConnectionId, String),
    /// Transport error. A [`TransportEvent::Closed`] follows.
    Failed(ConnectionId, String),
    /// Connection closed for any reason.
    Closed(ConnectionId),
}

impl TransportEvent {
    /// Returns the connection attempt this event belongs to.
    #[inline]
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            Self::Opened(id) | Self::Frame(id, _) | Self::Failed(id, _) | Self::Closed(id) => *id,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Starts connection attempts.
pub trait Transport {
    /// Handle to a started attempt.
    type Handle: ConnectionHandle;

    /// Begins connecting to `endpoint`.
    ///
    /// Returns an error only if the attempt cannot even be started; failures
    /// after that are reported as events tagged with `id`.
    fn connect(&mut self, id: ConnectionId, endpoint: &Endpoint) -> Result<Self::Handle>;
}

/// Controls one connection attempt.
///
/// Dropping the handle closes the connection.
pub trait ConnectionHandle {
    /// Queues a text frame for sending.
    fn send(&self, text: String) -> Result<()>;

    /// Asks the connection to close.
    fn close(&self);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_connection_id() {
        let id = ConnectionId::new(4);
        for event in [
            TransportEvent::Opened(id),
            TransportEvent::Frame(id, "x".into()),
            TransportEvent::Failed(id, "reset".into()),
            TransportEvent::Closed(id),
        ] {
            assert_eq!(event.connection_id(), id);
        }
    }
}
