//! Widget bindings and the append/replace rendering policy.
//!
//! A widget is an element that declares what it wants to display through
//! attributes:
//!
//! | Attribute | Default | Meaning |
//! |-----------|---------|---------|
//! | `data-tws-channel` | `log` | Channel to follow |
//! | `data-tws-type` | `log_line` | Message type; empty matches any type |
//! | `data-tws-mode` | `append` | `append` or `replace` |
//! | `data-tws-max` | `0` | Lines kept in append mode, 0 = unbounded |
//!
//! Bindings are read from the element on every dispatch, never cached.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::protocol::{FALLBACK_CHANNEL, FALLBACK_KIND, Message};

use super::page::Element;

// ============================================================================
// Constants
// ============================================================================

/// Attribute naming the widget's channel.
pub const CHANNEL_ATTR: &str = "data-tws-channel";

/// Attribute naming the widget's message type filter.
pub const KIND_ATTR: &str = "data-tws-type";

/// Attribute selecting append or replace rendering.
pub const MODE_ATTR: &str = "data-tws-mode";

/// Attribute limiting retained lines in append mode.
pub const MAX_LINES_ATTR: &str = "data-tws-max";

/// Class marking a monitor body as a widget even without a channel attribute.
pub const WIDGET_CLASS: &str = "tc-monitor-body";

/// Any line terminator that is not already a bare `\n`.
static LINE_ENDINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?").expect("valid line-ending pattern"));

// ============================================================================
// RenderMode
// ============================================================================

/// How a widget incorporates new text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Accumulate lines, bounded by `max_lines`.
    #[default]
    Append,
    /// Show only the latest text.
    Replace,
}

impl RenderMode {
    /// Parses the `data-tws-mode` value. Anything but `replace` appends.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("replace") {
            Self::Replace
        } else {
            Self::Append
        }
    }

    /// Returns the attribute value for this mode.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// WidgetBinding
// ============================================================================

/// What a widget subscribes to and how it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetBinding {
    /// Channel to follow.
    pub channel: String,
    /// Message type filter. Empty matches any type.
    pub kind: String,
    /// Rendering policy.
    pub mode: RenderMode,
    /// Lines kept in append mode. 0 keeps everything.
    pub max_lines: usize,
}

impl Default for WidgetBinding {
    fn default() -> Self {
        Self::new(FALLBACK_CHANNEL, FALLBACK_KIND)
    }
}

impl WidgetBinding {
    /// Creates an append-mode, unbounded binding.
    #[must_use]
    pub fn new(channel: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            kind: kind.into(),
            mode: RenderMode::Append,
            max_lines: 0,
        }
    }

    /// Sets the rendering mode.
    #[inline]
    #[must_use]
    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the retained line limit.
    #[inline]
    #[must_use]
    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Reads the binding declared on an element.
    ///
    /// Returns `None` if the element is not a widget. Missing attributes
    /// take their defaults; an unparsable line limit means unbounded.
    #[must_use]
    pub fn from_element(element: &Element) -> Option<Self> {
        if !element.has_attr(CHANNEL_ATTR) && !element.has_class(WIDGET_CLASS) {
            return None;
        }

        let channel = element
            .attr(CHANNEL_ATTR)
            .filter(|c| !c.is_empty())
            .unwrap_or(FALLBACK_CHANNEL);
        let kind = element.attr(KIND_ATTR).unwrap_or(FALLBACK_KIND);
        let mode = element.attr(MODE_ATTR).map(RenderMode::parse).unwrap_or_default();
        let max_lines = element
            .attr(MAX_LINES_ATTR)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        Some(Self {
            channel: channel.to_string(),
            kind: kind.to_string(),
            mode,
            max_lines,
        })
    }

    /// Builds an element carrying this binding.
    #[must_use]
    pub fn to_element(&self) -> Element {
        Element::new()
            .with_class(WIDGET_CLASS)
            .with_attr(CHANNEL_ATTR, self.channel.as_str())
            .with_attr(KIND_ATTR, self.kind.as_str())
            .with_attr(MODE_ATTR, self.mode.as_str())
            .with_attr(MAX_LINES_ATTR, self.max_lines.to_string())
    }

    /// Returns `true` if the message should be rendered by this widget.
    ///
    /// Messages without a channel never match.
    #[inline]
    #[must_use]
    pub fn accepts(&self, message: &Message) -> bool {
        message.has_channel()
            && self.channel == message.channel
            && (self.kind.is_empty() || self.kind == message.kind)
    }
}

// ============================================================================
// WidgetSink
// ============================================================================

/// Applies normalized text to widget elements.
pub struct WidgetSink;

impl WidgetSink {
    /// Collapses `\r\n` and lone `\r` into `\n`.
    ///
    /// Borrows the input when there is nothing to rewrite.
    #[must_use]
    pub fn normalize(text: &str) -> Cow<'_, str> {
        LINE_ENDINGS.replace_all(text, "\n")
    }

    /// Applies an already normalized line to a widget and scrolls it to
    /// the bottom.
    pub fn apply(element: &mut Element, binding: &WidgetBinding, line: &str) {
        match binding.mode {
            RenderMode::Replace => element.set_text(line),
            RenderMode::Append => {
                let buffer = element.text_mut();
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(line);

                if binding.max_lines > 0 {
                    truncate_to_last_lines(buffer, binding.max_lines);
                }
            }
        }

        element.scroll_to_bottom();
    }
}

/// Drops the oldest lines so at most `max_lines` remain.
fn truncate_to_last_lines(buffer: &mut String, max_lines: usize) {
    // The cut point sits just after the `max_lines`-th newline from the end.
    let cut = buffer
        .rmatch_indices('\n')
        .nth(max_lines - 1)
        .map(|(index, _)| index);

    if let Some(index) = cut {
        buffer.replace_range(..=index, "");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn append_all(binding: &WidgetBinding, lines: &[&str]) -> Element {
        let mut el = binding.to_element();
        for line in lines {
            WidgetSink::apply(&mut el, binding, &WidgetSink::normalize(line));
        }
        el
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(WidgetSink::normalize("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(WidgetSink::normalize("\r\r\n"), "\n\n");
    }

    #[test]
    fn test_normalize_borrows_clean_input() {
        assert!(matches!(WidgetSink::normalize("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_append_joins_with_newline() {
        let binding = WidgetBinding::new("log", "");
        let el = append_all(&binding, &["one", "two"]);
        assert_eq!(el.text(), "one\ntwo");
    }

    #[test]
    fn test_append_bounded_keeps_latest() {
        let binding = WidgetBinding::new("trades", "tick").max_lines(2);
        let el = append_all(&binding, &["1", "2", "3"]);
        assert_eq!(el.text(), "2\n3");
    }

    #[test]
    fn test_append_counts_embedded_lines() {
        let binding = WidgetBinding::new("log", "").max_lines(3);
        let el = append_all(&binding, &["a", "b\r\nc", "d"]);
        assert_eq!(el.text(), "b\nc\nd");
    }

    #[test]
    fn test_replace_discards_history() {
        let binding = WidgetBinding::new("price", "").mode(RenderMode::Replace).max_lines(1);
        let el = append_all(&binding, &["first\nline", "second\r\nline"]);
        assert_eq!(el.text(), "second\nline");
    }

    #[test]
    fn test_apply_scrolls_to_bottom() {
        let binding = WidgetBinding::new("log", "");
        let mut el = binding.to_element();
        el.set_scroll_top(0);
        WidgetSink::apply(&mut el, &binding, "a");
        WidgetSink::apply(&mut el, &binding, "b");
        assert_eq!(el.scroll_top(), 2);
    }

    #[test]
    fn test_binding_defaults_from_bare_widget_class() {
        let el = Element::new().with_class(WIDGET_CLASS);
        let binding = WidgetBinding::from_element(&el).expect("is a widget");
        assert_eq!(binding, WidgetBinding::new("log", "log_line"));
    }

    #[test]
    fn test_binding_reads_attributes() {
        let el = Element::new()
            .with_attr(CHANNEL_ATTR, "trades")
            .with_attr(KIND_ATTR, "")
            .with_attr(MODE_ATTR, "replace")
            .with_attr(MAX_LINES_ATTR, "5");
        let binding = WidgetBinding::from_element(&el).expect("is a widget");
        assert_eq!(binding.channel, "trades");
        assert_eq!(binding.kind, "");
        assert_eq!(binding.mode, RenderMode::Replace);
        assert_eq!(binding.max_lines, 5);
    }

    #[test]
    fn test_binding_bad_max_is_unbounded() {
        let el = Element::new()
            .with_attr(CHANNEL_ATTR, "log")
            .with_attr(MAX_LINES_ATTR, "-3");
        assert_eq!(WidgetBinding::from_element(&el).map(|b| b.max_lines), Some(0));
    }

    #[test]
    fn test_plain_element_is_not_a_widget() {
        assert!(WidgetBinding::from_element(&Element::new()).is_none());
    }

    #[test]
    fn test_to_element_round_trips_binding() {
        let binding = WidgetBinding::new("trades", "tick")
            .mode(RenderMode::Replace)
            .max_lines(9);
        assert_eq!(WidgetBinding::from_element(&binding.to_element()), Some(binding));
    }

    #[test]
    fn test_accepts_routing_predicate() {
        let default = WidgetBinding::default();
        assert!(default.accepts(&Message::new("log", "log_line", "x")));
        assert!(!default.accepts(&Message::new("log", "alert", "x")));

        let wildcard = WidgetBinding::new("log", "");
        assert!(wildcard.accepts(&Message::new("log", "alert", "x")));
        assert!(!wildcard.accepts(&Message::new("trades", "alert", "x")));
        assert!(!WidgetBinding::new("", "").accepts(&Message::new("", "", "x")));
    }

    proptest! {
        #[test]
        fn prop_bounded_append_keeps_last_n(
            lines in prop::collection::vec("[a-z0-9]{1,8}", 1..40),
            max in 1usize..10,
        ) {
            let binding = WidgetBinding::new("log", "").max_lines(max);
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            let el = append_all(&binding, &refs);

            let start = lines.len().saturating_sub(max);
            prop_assert_eq!(el.text(), lines[start..].join("\n"));
        }

        #[test]
        fn prop_normalized_text_has_no_carriage_returns(text in "[a-c\r\n]{0,32}") {
            let normalized = WidgetSink::normalize(&text);
            prop_assert!(!normalized.contains('\r'));
            prop_assert_eq!(
                normalized.matches('\n').count(),
                text.matches("\r\n").count()
                    + text.matches('\r').count()
                    + text.matches('\n').count()
                    - 2 * text.matches("\r\n").count()
            );
        }
    }
}
