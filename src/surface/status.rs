//! Online/offline indicator.
//!
//! Every element flagged with `data-tws-status` shows the same label and
//! emphasis class. The sink keeps no state of its own.

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use super::Document;

// ============================================================================
// Constants
// ============================================================================

/// Attribute flagging an element as a status surface.
pub const STATUS_ATTR: &str = "data-tws-status";

// ============================================================================
// StatusView
// ============================================================================

/// Label and emphasis shown for one connectivity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    /// Text shown on the surface.
    pub label: &'static str,
    /// Emphasis class applied to the surface.
    pub class: &'static str,
}

impl StatusView {
    /// Shown while the connection is open.
    pub const ONLINE: Self = Self {
        label: "ONLINE",
        class: "bg-green",
    };

    /// Shown whenever the connection is not open.
    pub const OFFLINE: Self = Self {
        label: "OFFLINE",
        class: "bg-red",
    };

    /// Returns the view for a connectivity flag.
    #[inline]
    #[must_use]
    pub const fn for_online(online: bool) -> Self {
        if online { Self::ONLINE } else { Self::OFFLINE }
    }
}

// ============================================================================
// StatusSink
// ============================================================================

/// Broadcasts connectivity to status surfaces.
pub struct StatusSink;

impl StatusSink {
    /// Applies the online/offline view to every status surface present now.
    ///
    /// Returns the number of surfaces updated.
    pub fn set_online<D: Document + ?Sized>(document: &mut D, online: bool) -> usize {
        let view = StatusView::for_online(online);
        let stale = StatusView::for_online(!online);
        let mut updated = 0;

        for id in document.status_surfaces() {
            let applied = document.with_element(id, &mut |el| {
                el.set_text(view.label);
                el.remove_class(stale.class);
                el.add_class(view.class);
            });
            if applied {
                updated += 1;
            }
        }

        trace!(online, updated, "Status surfaces updated");
        updated
    }
}

// ============================================================================
// Tests
// ============================================================================
