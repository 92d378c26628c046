//! Error types for the connection monitor.
//!
//! Almost nothing in this crate is fatal: connection failures are absorbed by
//! the reconnect loop and malformed frames are wrapped instead of rejected.
//! The variants below surface only where a caller can act on them, such as
//! configuration validation or sending on a connection that is not open.
//!
//! # Usage
//!
//! ```ignore
//! use tws_monitor::{Monitor, Result};
//!
//! fn example() -> Result<()> {
//!     let options = Monitor::builder()
//!         .origin("https://dashboard.local/logs")
//!         .service_port(8081)
//!         .build()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Execution | [`Error::Timeout`] |
//! | External | [`Error::Url`], [`Error::Json`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::monitor::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when monitor options fail validation.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection could not be created.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The connection (or the monitor task behind it) is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    /// An operation needed an open connection.
    #[error("Not connected (state: {state})")]
    NotConnected {
        /// State of the manager when the operation was attempted.
        state: ConnectionState,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a not-connected error for the given state.
    #[inline]
    pub fn not_connected(state: ConnectionState) -> Self {
        Self::NotConnected { state }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this error relates to the transport connection.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::NotConnected { .. }
        )
    }

    /// Returns `true` if retrying later may succeed.
    ///
    /// Connection errors clear up once the reconnect loop re-establishes
    /// the link; configuration and encoding errors never do.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.is_connection_error() || self.is_timeout()
    }
}

// ============================================================================
// Tests
// ============================================================================
