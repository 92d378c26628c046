//! Display surfaces driven by the monitor.
//!
//! The monitor never holds on to widgets. On every frame it asks a
//! [`Document`] which widgets exist right now, and on every connectivity
//! change which status surfaces exist right now. Widgets added or removed
//! between frames are picked up or skipped without any bookkeeping.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | Enumerates surfaces and updates one element at a time |
//! | [`Page`] | In-memory document of [`Element`]s |
//! | [`WidgetSink`] | Append/replace rendering with line limits |
//! | [`StatusSink`] | Online/offline label and emphasis |
//!
//! Elements carrying [`SEND_ATTR`] hold a JSON payload the caller can push
//! to the service with [`Monitor::send_element`](crate::Monitor::send_element).

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::ElementId;
use crate::protocol::Message;

// ============================================================================
// Submodules
// ============================================================================

/// In-memory page of display elements.
pub mod page;

/// Online/offline indicator.
pub mod status;

/// Widget bindings and rendering policy.
pub mod widget;

// ============================================================================
// Re-exports
// ============================================================================

pub use page::{Element, Page, SharedPage};
pub use status::{STATUS_ATTR, StatusSink, StatusView};
pub use widget::{
    CHANNEL_ATTR, KIND_ATTR, MAX_LINES_ATTR, MODE_ATTR, RenderMode, WIDGET_CLASS, WidgetBinding,
    WidgetSink,
};

// ============================================================================
// Constants
// ============================================================================

/// Attribute holding an outbound JSON payload.
pub const SEND_ATTR: &str = "data-tws-send";

// ============================================================================
// WidgetDescriptor
// ============================================================================

/// A widget present in the document, with the binding read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDescriptor {
    /// Element owning the text buffer.
    pub id: ElementId,
    /// Binding declared on the element.
    pub binding: WidgetBinding,
}

// ============================================================================
// Document
// ============================================================================

/// The set of surfaces a monitor renders into.
pub trait Document {
    /// Widgets present right now, in document order.
    fn widgets(&self) -> Vec<WidgetDescriptor>;

    /// Status surfaces present right now, in document order.
    fn status_surfaces(&self) -> Vec<ElementId>;

    /// Runs `update` on an element if it is still present.
    ///
    /// Returns `false` if the element has been removed, in which case
    /// nothing happens.
    fn with_element(&mut self, id: ElementId, update: &mut dyn FnMut(&mut Element)) -> bool;

    /// Widgets present right now that accept a message.
    fn widgets_matching(&self, message: &Message) -> Vec<WidgetDescriptor> {
        let mut widgets = self.widgets();
        widgets.retain(|w| w.binding.accepts(message));
        widgets
    }

    /// Outbound payload declared on an element, if it is still present and
    /// carries [`SEND_ATTR`].
    fn send_payload(&mut self, id: ElementId) -> Option<String> {
        let mut payload = None;
        self.with_element(id, &mut |el| payload = el.attr(SEND_ATTR).map(str::to_owned));
        payload
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_payload_reads_attribute() {
        let mut page = Page::new();
        let button = page.insert(Element::send_button(r#"{"cmd":"ping"}"#));
        let plain = page.insert(Element::new());

        assert_eq!(page.send_payload(button).as_deref(), Some(r#"{"cmd":"ping"}"#));
        assert_eq!(page.send_payload(plain), None);

        page.remove(button);
        assert_eq!(page.send_payload(button), None);
    }

    #[test]
    fn test_send_payload_through_shared_page() {
        let mut shared = Page::shared();
        let button = shared.lock().insert(Element::send_button("{}"));
        assert_eq!(shared.send_payload(button).as_deref(), Some("{}"));
    }
}
