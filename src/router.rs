//! Frame decoding and fan-out to widgets.
//!
//! A frame becomes a [`Message`], the message text is normalized once, and
//! every widget whose binding accepts the message renders it. Messages
//! without a channel are dropped before any widget is consulted.
//!
//! # Example
//!
//! ```
//! use tws_monitor::router::MessageRouter;
//! use tws_monitor::surface::{Page, WidgetBinding};
//!
//! let mut page = Page::new();
//! let id = page.insert_widget(&WidgetBinding::new("trades", "tick").max_lines(2));
//!
//! for n in 1..=3 {
//!     let frame = format!(r#"{{"channel":"trades","type":"tick","text":"{n}"}}"#);
//!     MessageRouter::handle_frame(&mut page, &frame);
//! }
//!
//! assert_eq!(page.text_of(id), Some("2\n3"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use crate::protocol::Message;
use crate::surface::{Document, WidgetSink};

// ============================================================================
// MessageRouter
// ============================================================================

/// Decodes frames and routes them to matching widgets.
pub struct MessageRouter;

impl MessageRouter {
    /// Decodes a raw frame. Never fails; see [`Message::decode`].
    #[inline]
    #[must_use]
    pub fn route(raw: &str) -> Message {
        Message::decode(raw)
    }

    /// Renders a message into every widget that accepts it.
    ///
    /// Returns the number of widgets updated. Widgets removed between
    /// enumeration and update are skipped.
    pub fn dispatch<D: Document + ?Sized>(document: &mut D, message: &Message) -> usize {
        if !message.has_channel() {
            trace!(text = %message.text, "Dropping message without channel");
            return 0;
        }

        let line = WidgetSink::normalize(&message.text);
        let mut updated = 0;

        for widget in document.widgets_matching(message) {
            let binding = widget.binding;
            if document.with_element(widget.id, &mut |el| WidgetSink::apply(el, &binding, &line)) {
                updated += 1;
            }
        }

        trace!(
            channel = %message.channel,
            kind = %message.kind,
            matched = updated,
            "Message dispatched"
        );
        updated
    }

    /// Decodes a frame and dispatches it.
    pub fn handle_frame<D: Document + ?Sized>(document: &mut D, raw: &str) -> usize {
        let message = Self::route(raw);
        Self::dispatch(document, &message)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::ElementId;
    use crate::surface::{Element, Page, RenderMode, WidgetBinding};

    fn frame(channel: &str, kind: &str, text: &str) -> String {
        Message::new(channel, kind, text)
            .to_frame()
            .expect("serialize")
    }

    fn text(page: &Page, id: ElementId) -> &str {
        page.text_of(id).expect("widget present")
    }

    #[test]
    fn test_bounded_append_scenario() {
        let mut page = Page::new();
        let id = page.insert_widget(&WidgetBinding::new("trades", "tick").max_lines(2));

        for n in ["1", "2", "3"] {
            assert_eq!(MessageRouter::handle_frame(&mut page, &frame("trades", "tick", n)), 1);
        }

        assert_eq!(text(&page, id), "2\n3");
    }

    #[test]
    fn test_default_kind_rejects_other_kinds() {
        let mut page = Page::new();
        let id = page.insert(Element::new().with_attr("data-tws-channel", "log"));

        let updated = MessageRouter::handle_frame(&mut page, &frame("log", "alert", "disk full"));

        assert_eq!(updated, 0);
        assert_eq!(text(&page, id), "");
    }

    #[test]
    fn test_wildcard_kind_accepts_any_kind() {
        let mut page = Page::new();
        let id = page.insert_widget(&WidgetBinding::new("log", ""));

        MessageRouter::handle_frame(&mut page, &frame("log", "alert", "disk full"));
        MessageRouter::handle_frame(&mut page, &frame("log", "log_line", "ok"));

        assert_eq!(text(&page, id), "disk full\nok");
    }

    #[test]
    fn test_missing_channel_changes_nothing() {
        let mut page = Page::new();
        let wildcard = page.insert_widget(&WidgetBinding::new("log", "").max_lines(3));
        let replace = page.insert_widget(&WidgetBinding::new("", "").mode(RenderMode::Replace));
        page.get_mut(wildcard).expect("present").set_text("keep");

        let updated = MessageRouter::handle_frame(&mut page, r#"{"type":"log_line","text":"x"}"#);

        assert_eq!(updated, 0);
        assert_eq!(text(&page, wildcard), "keep");
        assert_eq!(text(&page, replace), "");
    }

    #[test]
    fn test_non_json_frame_reaches_log_widgets() {
        let mut page = Page::new();
        let log = page.insert_widget(&WidgetBinding::default());
        let trades = page.insert_widget(&WidgetBinding::new("trades", ""));

        let updated = MessageRouter::handle_frame(&mut page, "Oct 18 12:00:01 bbscan[42]: tick");

        assert_eq!(updated, 1);
        assert_eq!(text(&page, log), "Oct 18 12:00:01 bbscan[42]: tick");
        assert_eq!(text(&page, trades), "");
    }

    #[test]
    fn test_fan_out_to_multiple_widgets() {
        let mut page = Page::new();
        let tail = page.insert_widget(&WidgetBinding::new("log", "log_line"));
        let last = page.insert_widget(&WidgetBinding::new("log", "").mode(RenderMode::Replace));

        MessageRouter::handle_frame(&mut page, &frame("log", "log_line", "a\r\nb"));
        MessageRouter::handle_frame(&mut page, &frame("log", "log_line", "c"));

        assert_eq!(text(&page, tail), "a\nb\nc");
        assert_eq!(text(&page, last), "c");
    }

    #[test]
    fn test_widgets_added_between_frames_are_picked_up() {
        let mut page = Page::new();
        let first = page.insert_widget(&WidgetBinding::default());
        MessageRouter::handle_frame(&mut page, &frame("log", "log_line", "one"));

        let second = page.insert_widget(&WidgetBinding::default());
        page.remove(first);
        MessageRouter::handle_frame(&mut page, &frame("log", "log_line", "two"));

        assert_eq!(text(&page, second), "two");
        assert!(page.get(first).is_none());
    }

    #[test]
    fn test_no_widgets_is_silent() {
        let mut page = Page::new();
        assert_eq!(MessageRouter::handle_frame(&mut page, &frame("log", "x", "y")), 0);
    }
}
