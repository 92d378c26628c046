//! Wire protocol message types.
//!
//! The monitor only understands a thin envelope on top of the transport:
//!
//! | Field | Required | Purpose |
//! |-------|----------|---------|
//! | `channel` | yes | Routing channel |
//! | `type` | no | Message type within the channel |
//! | `text` / `message` / `msg` | no | Display text |
//!
//! Anything else in a frame is ignored.

// ============================================================================
// Submodules
// ============================================================================

/// Decoded message envelope.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{FALLBACK_CHANNEL, FALLBACK_KIND, Message};
