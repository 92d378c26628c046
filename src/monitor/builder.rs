//! Builder pattern for monitor configuration.
//!
//! Provides a fluent API for configuring and spawning [`Monitor`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tws_monitor::{Monitor, Page};
//!
//! # async fn example() -> tws_monitor::Result<()> {
//! let monitor = Monitor::builder()
//!     .origin("http://127.0.0.1:8080/dashboard")
//!     .service_port(8081)
//!     .reconnect_delay(Duration::from_secs(2))
//!     .spawn(Page::shared())?;
//! # monitor.shutdown().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::surface::Document;

use super::options::MonitorOptions;
use super::runtime::Monitor;

// ============================================================================
// MonitorBuilder
// ============================================================================

/// Builder for configuring a [`Monitor`].
///
/// Use [`Monitor::builder()`] to create a new builder. Unset values fall
/// back to [`MonitorOptions::default`].
#[derive(Debug, Default, Clone)]
pub struct MonitorBuilder {
    /// Page origin, unparsed.
    origin: Option<String>,
    /// Service port.
    service_port: Option<u16>,
    /// Reconnect delay.
    reconnect_delay: Option<Duration>,
}

// ============================================================================
// MonitorBuilder Implementation
// ============================================================================

impl MonitorBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin of the page hosting the widgets.
    ///
    /// The service host is taken from it, and an `https` origin selects `wss`.
    ///
    /// # Arguments
    ///
    /// * `origin` - Page URL (e.g., "http://127.0.0.1:8080/")
    #[inline]
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Sets the port of the local service.
    #[inline]
    #[must_use]
    pub fn service_port(mut self, port: u16) -> Self {
        self.service_port = Some(port);
        self
    }

    /// Sets the constant delay between a disconnect and the next attempt.
    #[inline]
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    /// Builds validated options without spawning anything.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the origin does not parse
    /// - [`Error::Config`] if the options fail [`MonitorOptions::validate`]
    pub fn build(self) -> Result<MonitorOptions> {
        let mut options = MonitorOptions::new();

        if let Some(origin) = &self.origin {
            let url = Url::parse(origin)
                .map_err(|e| Error::config(format!("Invalid origin '{origin}': {e}")))?;
            options = options.with_origin(url);
        }
        if let Some(port) = self.service_port {
            options = options.with_service_port(port);
        }
        if let Some(delay) = self.reconnect_delay {
            options = options.with_reconnect_delay(delay);
        }

        options.validate()?;
        Ok(options)
    }

    /// Builds the options and spawns a monitor rendering into `document`.
    ///
    /// # Errors
    ///
    /// - Any error from [`build`](Self::build)
    /// - [`Error::Config`] if called outside a Tokio runtime
    pub fn spawn<D>(self, document: D) -> Result<Monitor>
    where
        D: Document + Send + 'static,
    {
        let options = self.build()?;
        Monitor::spawn(options, document)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::monitor::options::{DEFAULT_RECONNECT_DELAY, DEFAULT_SERVICE_PORT};
    use crate::surface::Page;

    #[test]
    fn test_empty_builder_yields_defaults() {
        let options = MonitorBuilder::new().build().expect("valid");
        assert_eq!(options, MonitorOptions::default());
        assert_eq!(options.service_port, DEFAULT_SERVICE_PORT);
        assert_eq!(options.reconnect_delay, DEFAULT_RECONNECT_DELAY);
    }

    #[test]
    fn test_setters_apply() {
        let options = MonitorBuilder::new()
            .origin("https://monitor.example:8443/app")
            .service_port(9443)
            .reconnect_delay(Duration::from_millis(250))
            .build()
            .expect("valid");

        assert_eq!(options.origin.host_str(), Some("monitor.example"));
        assert_eq!(options.service_port, 9443);
        assert_eq!(options.reconnect_delay, Duration::from_millis(250));
        assert_eq!(
            options.endpoint().expect("endpoint").to_string(),
            "wss://monitor.example:9443/"
        );
    }

    #[test]
    fn test_invalid_origin_is_config_error() {
        let err = MonitorBuilder::new().origin("not a url").build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_validation_runs_on_build() {
        let err = MonitorBuilder::new()
            .reconnect_delay(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = MonitorBuilder::new()
            .origin("http://127.0.0.1:8081/")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let result = MonitorBuilder::new().spawn(Page::new());
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
