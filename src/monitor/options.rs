//! Monitor configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tws_monitor::MonitorOptions;
//!
//! let options = MonitorOptions::new()
//!     .with_service_port(9001)
//!     .with_reconnect_delay(Duration::from_millis(500));
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

use super::endpoint::Endpoint;

// ============================================================================
// Constants
// ============================================================================

/// Port the local service listens on.
pub const DEFAULT_SERVICE_PORT: u16 = 8081;

/// Delay between a disconnect and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Origin assumed when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

// ============================================================================
// MonitorOptions
// ============================================================================

/// Connection monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Origin of the page hosting the widgets.
    pub origin: Url,

    /// Fixed port of the service on the origin's host.
    pub service_port: u16,

    /// Constant delay before each reconnect attempt.
    pub reconnect_delay: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl MonitorOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            service_port: DEFAULT_SERVICE_PORT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl MonitorOptions {
    /// Sets the page origin.
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the service port.
    #[inline]
    #[must_use]
    pub fn with_service_port(mut self, port: u16) -> Self {
        self.service_port = port;
        self
    }

    /// Sets the reconnect delay.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl MonitorOptions {
    /// Checks that the options describe a usable monitor.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the service port is 0 or equals the page's own port
    /// - [`Error::Config`] if the reconnect delay is zero
    pub fn validate(&self) -> Result<()> {
        if self.service_port == 0 {
            return Err(Error::config("service port must not be 0"));
        }

        if self.origin.port_or_known_default() == Some(self.service_port) {
            return Err(Error::config(format!(
                "service port {} is the page's own port",
                self.service_port
            )));
        }

        if self.reconnect_delay.is_zero() {
            return Err(Error::config("reconnect delay must be non-zero"));
        }

        Ok(())
    }

    /// Derives the service endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if the endpoint URL cannot be built.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::from_origin(&self.origin, self.service_port)
    }
}

// ============================================================================
// Tests
// ============================================================================
