//! Type-safe identifiers.
//!
//! Newtype wrappers keep connection attempts and page elements from being
//! mixed up at compile time.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ConnectionId
// ============================================================================

/// Identifies one connection attempt made by a manager.
///
/// Every call to [`Transport::connect`](crate::transport::Transport::connect)
/// receives a fresh id, and every transport event carries it back. Events
/// whose id no longer matches the live connection are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a connection id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the id following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ============================================================================
// ElementId
// ============================================================================

/// Identifies an element inserted into a [`Page`](crate::surface::Page).
///
/// Ids are handed out in insertion order and never reused, so ordering by id
/// is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Creates an element id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
