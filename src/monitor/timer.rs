//! Reconnect timer.
//!
//! The manager arms the timer after a disconnect and starts a new attempt
//! when it fires. Firing is reported back through the same event queue as
//! transport events, so it never races with frame handling.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

// ============================================================================
// Types
// ============================================================================

/// Callback invoked when the timer fires.
pub type FireHandler = Arc<dyn Fn() + Send + Sync>;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
#[inline]
#[must_use]
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// ReconnectTimer
// ============================================================================

/// A single-shot timer owned by the connection manager.
pub trait ReconnectTimer {
    /// Arms the timer. Arming while armed replaces the pending shot.
    fn arm(&mut self, delay: Duration);

    /// Disarms the timer if armed.
    fn cancel(&mut self);
}

// ============================================================================
// TokioTimer
// ============================================================================

/// Timer backed by `tokio::time::sleep` in a spawned task.
///
/// Must be armed from within a Tokio runtime.
pub struct TokioTimer {
    on_fire: FireHandler,
    pending: Option<JoinHandle<()>>,
}

impl TokioTimer {
    /// Creates a disarmed timer.
    #[must_use]
    pub fn new(on_fire: FireHandler) -> Self {
        Self {
            on_fire,
            pending: None,
        }
    }

    /// Returns `true` if a shot is armed and has not fired yet.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl ReconnectTimer for TokioTimer {
    fn arm(&mut self, delay: Duration) {
        self.cancel();

        let on_fire = Arc::clone(&self.on_fire);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        }));

        trace!(delay_ms = saturating_millis(delay), "Reconnect timer armed");
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================
