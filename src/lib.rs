//! TWS Monitor - Self-healing WebSocket feed for live log widgets.
//!
//! This library keeps a single WebSocket connection to a local service alive
//! and renders what the service pushes into text widgets on a page.
//!
//! # Architecture
//!
//! The monitor follows a client-service model:
//!
//! - **Service**: Listens on a fixed port of the page's host, pushes JSON frames
//! - **Monitor (Rust)**: Connects, routes frames to widgets, reconnects forever
//!
//! Key design principles:
//!
//! - Exactly one connection and at most one pending reconnect at any time
//! - Frames carry `{channel, type, text}`; anything else becomes a `log` line
//! - Widgets and status surfaces are discovered on every event, never cached
//! - All transitions run on one task, in arrival order
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use tws_monitor::{Element, Monitor, Page, Result, WidgetBinding};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // A tail of the last 100 log lines and one status badge
//!     let page = Page::shared();
//!     let tail = {
//!         let mut page = page.lock();
//!         page.insert(Element::status());
//!         page.insert_widget(&WidgetBinding::default().max_lines(100))
//!     };
//!
//!     let monitor = Monitor::builder()
//!         .origin("http://localhost/")
//!         .service_port(8081)
//!         .spawn(page.clone())?;
//!
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     println!("{}", page.lock().text_of(tail).unwrap_or_default());
//!
//!     monitor.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`monitor`] | Connection manager, options, and runtime |
//! | [`protocol`] | Frame envelope decoding |
//! | [`router`] | Frame fan-out to widgets |
//! | [`surface`] | Widgets, status surfaces, in-memory page |
//! | [`transport`] | WebSocket transport layer |
//!
//! # Features
//!
//! - **`tls`**: `wss://` support for pages served over `https`

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// Fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for connections and elements.
pub mod identifiers;

/// Connection lifecycle, reconnect policy, and the monitor task.
///
/// Use [`Monitor::builder()`] to configure and spawn a monitor.
pub mod monitor;

/// Wire protocol message types.
pub mod protocol;

/// Routes decoded frames to widgets.
pub mod router;

/// Display surfaces: widgets, status indicators, pages.
pub mod surface;

/// WebSocket transport layer.
///
/// Internal seam between the connection manager and the socket.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, ElementId};

// Monitor types
pub use monitor::{
    ConnectionManager, ConnectionState, Endpoint, Monitor, MonitorBuilder, MonitorOptions,
};

// Protocol types
pub use protocol::Message;

// Router
pub use router::MessageRouter;

// Surface types
pub use surface::{
    Document, Element, Page, RenderMode, SharedPage, StatusSink, WidgetBinding, WidgetSink,
};
