//! Connection lifecycle states.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the monitored connection.
///
/// ```text
/// Idle ──start──► Connecting ──open──► Open ──close/error──► Closed
///                     ▲                                        │
///                     └──────────── reconnect timer ───────────┘
/// ```
///
/// `Idle` is only ever the initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Created, never started.
    #[default]
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Connected; frames flow.
    Open,
    /// Disconnected; a reconnect is pending or the monitor was torn down.
    Closed,
}

impl ConnectionState {
    /// Returns `true` while a connection exists or is being established.
    ///
    /// `start()` is a no-op in these states.
    #[inline]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    /// Returns `true` if frames can be sent and received.
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns the lowercase state name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
