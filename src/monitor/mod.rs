//! Connection monitor.
//!
//! Keeps exactly one WebSocket connection to a local service alive, routes
//! every inbound frame to the page's widgets, and mirrors connectivity onto
//! status surfaces. After any disconnect a single reconnect attempt is
//! scheduled after a constant delay, forever.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tws_monitor::{ConnectionState, Monitor, Page, WidgetBinding};
//!
//! # async fn example() -> tws_monitor::Result<()> {
//! let page = Page::shared();
//! page.lock().insert_widget(&WidgetBinding::default().max_lines(200));
//!
//! let monitor = Monitor::builder()
//!     .origin("http://localhost/")
//!     .spawn(page.clone())?;
//!
//! monitor
//!     .wait_for_state(ConnectionState::Open, Duration::from_secs(10))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `state` | [`ConnectionState`] |
//! | `endpoint` | Service URL derived from the page origin |
//! | `options` | [`MonitorOptions`] and defaults |
//! | `builder` | [`MonitorBuilder`] |
//! | `timer` | [`ReconnectTimer`] and [`TokioTimer`] |
//! | `manager` | [`ConnectionManager`] state machine |
//! | `runtime` | [`Monitor`] task and handle |

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for monitor configuration.
pub mod builder;

/// Service endpoint derivation.
pub mod endpoint;

/// Connection lifecycle state machine.
pub mod manager;

/// Monitor configuration.
pub mod options;

/// Monitor task and handle.
pub mod runtime;

/// Connection lifecycle states.
pub mod state;

/// Reconnect timer.
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::MonitorBuilder;
pub use endpoint::Endpoint;
pub use manager::ConnectionManager;
pub use options::{DEFAULT_ORIGIN, DEFAULT_RECONNECT_DELAY, DEFAULT_SERVICE_PORT, MonitorOptions};
pub use runtime::Monitor;
pub use state::ConnectionState;
pub use timer::{FireHandler, ReconnectTimer, TokioTimer};
