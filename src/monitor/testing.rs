//! In-memory transport and timer for driving the manager with synthetic
//! events.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::transport::{ConnectionHandle, Transport};

use super::endpoint::Endpoint;
use super::timer::ReconnectTimer;

// ============================================================================
// FakeTransport
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct TransportLog {
    /// Every successful connect, with the endpoint it targeted.
    pub connects: Vec<(ConnectionId, String)>,
    pub sent: Vec<(ConnectionId, String)>,
    pub closed: Vec<ConnectionId>,
    /// Handles not yet dropped.
    pub live: usize,
    /// Makes `connect` fail.
    pub refuse: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    pub log: Arc<Mutex<TransportLog>>,
}

impl Transport for FakeTransport {
    type Handle = FakeHandle;

    fn connect(&mut self, id: ConnectionId, endpoint: &Endpoint) -> Result<FakeHandle> {
        let mut log = self.log.lock();
        if log.refuse {
            return Err(Error::connection("refused"));
        }

        log.connects.push((id, endpoint.to_string()));
        log.live += 1;

        Ok(FakeHandle {
            id,
            log: Arc::clone(&self.log),
        })
    }
}

pub(crate) struct FakeHandle {
    id: ConnectionId,
    log: Arc<Mutex<TransportLog>>,
}

impl ConnectionHandle for FakeHandle {
    fn send(&self, text: String) -> Result<()> {
        self.log.lock().sent.push((self.id, text));
        Ok(())
    }

    fn close(&self) {
        self.log.lock().closed.push(self.id);
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.log.lock().live -= 1;
    }
}

// ============================================================================
// ManualTimer
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct TimerLog {
    pub armed: Vec<Duration>,
    pub cancelled: usize,
    pub pending: bool,
}

/// Timer that only fires when a test says so.
///
/// Panics if armed while a shot is already pending.
#[derive(Clone, Default)]
pub(crate) struct ManualTimer {
    pub log: Arc<Mutex<TimerLog>>,
}

impl ManualTimer {
    /// Consumes the pending shot. Returns `false` if none was armed.
    pub fn take_pending(&self) -> bool {
        std::mem::replace(&mut self.log.lock().pending, false)
    }
}

impl ReconnectTimer for ManualTimer {
    fn arm(&mut self, delay: Duration) {
        let mut log = self.log.lock();
        assert!(!log.pending, "reconnect timer armed while already pending");
        log.pending = true;
        log.armed.push(delay);
    }

    fn cancel(&mut self) {
        let mut log = self.log.lock();
        if log.pending {
            log.cancelled += 1;
        }
        log.pending = false;
    }
}
