//! Decoded message envelope.
//!
//! The service pushes JSON envelopes of the form:
//!
//! ```json
//! { "channel": "log", "type": "log_line", "text": "service started" }
//! ```
//!
//! The text may also arrive as `message` or `msg`. Frames that are not JSON
//! at all are still delivered, wrapped as a `log`/`log_line` message whose
//! text is the raw frame.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Map, Value, from_str, to_string};

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Channel assigned to frames that fail to decode.
pub const FALLBACK_CHANNEL: &str = "log";

/// Kind assigned to frames that fail to decode.
pub const FALLBACK_KIND: &str = "log_line";

/// Envelope fields holding the human-readable text, in order of preference.
const TEXT_FIELDS: [&str; 3] = ["text", "message", "msg"];

// ============================================================================
// Message
// ============================================================================

/// A frame decoded into its routing key and display text.
///
/// # Format
///
/// Serializes back into the wire envelope (`kind` is written as `type`),
/// which is what test servers and demos push to the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Routing channel. Empty means the frame carried no channel.
    pub channel: String,

    /// Message type within the channel. Empty if absent.
    #[serde(rename = "type")]
    pub kind: String,

    /// Display text.
    pub text: String,
}

impl Message {
    /// Creates a message.
    #[inline]
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        kind: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            kind: kind.into(),
            text: text.into(),
        }
    }

    /// Wraps a frame that could not be decoded.
    #[inline]
    #[must_use]
    pub fn fallback(raw: &str) -> Self {
        Self::new(FALLBACK_CHANNEL, FALLBACK_KIND, raw)
    }

    /// Decodes a raw frame. Never fails.
    ///
    /// Non-JSON input produces [`Message::fallback`]. JSON that is not an
    /// object decodes to a message without a channel, which the router drops.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        match from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::fallback(raw),
        }
    }

    /// Returns `true` if the message carries a routable channel.
    #[inline]
    #[must_use]
    pub fn has_channel(&self) -> bool {
        !self.channel.is_empty()
    }

    /// Encodes the message as a wire envelope.
    pub fn to_frame(&self) -> Result<String> {
        Ok(to_string(self)?)
    }

    fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::new("", "", value.to_string());
        };

        let channel = fields.get("channel").and_then(scalar_text).unwrap_or_default();
        let kind = fields.get("type").and_then(scalar_text).unwrap_or_default();
        let text = display_text(fields).unwrap_or_else(|| value.to_string());

        Self {
            channel,
            kind,
            text,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Renders a routing field. Only scalars count as a channel or type.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Picks the first present text field and renders it.
fn display_text(fields: &Map<String, Value>) -> Option<String> {
    let value = TEXT_FIELDS
        .iter()
        .find_map(|name| fields.get(*name).filter(|v| !v.is_null()))?;

    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_envelope() {
        let msg = Message::decode(r#"{"channel":"trades","type":"tick","text":"BTC 64000"}"#);
        assert_eq!(msg, Message::new("trades", "tick", "BTC 64000"));
    }

    #[test]
    fn test_decode_non_json_falls_back() {
        let msg = Message::decode("plain journal line");
        assert_eq!(msg, Message::new("log", "log_line", "plain journal line"));
    }

    #[test]
    fn test_decode_truncated_json_falls_back() {
        let raw = r#"{"channel":"log","text":"cut"#;
        assert_eq!(Message::decode(raw), Message::fallback(raw));
    }

    #[test]
    fn test_text_field_preference() {
        let msg = Message::decode(r#"{"channel":"c","msg":"third","message":"second"}"#);
        assert_eq!(msg.text, "second");

        let msg = Message::decode(r#"{"channel":"c","msg":"third","text":"first"}"#);
        assert_eq!(msg.text, "first");

        let msg = Message::decode(r#"{"channel":"c","msg":"third"}"#);
        assert_eq!(msg.text, "third");
    }

    #[test]
    fn test_null_text_field_is_skipped() {
        let msg = Message::decode(r#"{"channel":"c","text":null,"message":"second"}"#);
        assert_eq!(msg.text, "second");
    }

    #[test]
    fn test_missing_text_renders_whole_frame() {
        let msg = Message::decode(r#"{"channel":"metrics","type":"cpu","load":0.5}"#);
        assert_eq!(msg.kind, "cpu");
        let rendered: Value = from_str(&msg.text).expect("rendering is JSON");
        assert_eq!(rendered["load"], 0.5);
        assert_eq!(rendered["channel"], "metrics");
    }

    #[test]
    fn test_non_string_text_is_rendered() {
        let msg = Message::decode(r#"{"channel":"c","text":42}"#);
        assert_eq!(msg.text, "42");
    }

    #[test]
    fn test_missing_type_defaults_to_empty() {
        let msg = Message::decode(r#"{"channel":"log","text":"x"}"#);
        assert_eq!(msg.kind, "");
    }

    #[test]
    fn test_missing_channel_has_no_channel() {
        let msg = Message::decode(r#"{"type":"log_line","text":"orphan"}"#);
        assert!(!msg.has_channel());
        assert_eq!(msg.text, "orphan");
    }

    #[test]
    fn test_non_object_json_has_no_channel() {
        assert!(!Message::decode("42").has_channel());
        assert!(!Message::decode(r#""quoted""#).has_channel());
        assert!(!Message::decode("[1,2]").has_channel());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let msg = Message::decode(r#"{"channel":"log","type":"log_line","text":"x","ts":1}"#);
        assert_eq!(msg, Message::new("log", "log_line", "x"));
    }

    #[test]
    fn test_to_frame_uses_type_key() {
        let frame = Message::new("log", "log_line", "hi")
            .to_frame()
            .expect("serialize");
        let value: Value = from_str(&frame).expect("valid JSON");
        assert_eq!(value["type"], "log_line");
        assert!(value.get("kind").is_none());
    }
}
