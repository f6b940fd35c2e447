//! Frame encoding for push streams.
//!
//! Each delivered event is one text block:
//!
//! ```text
//! event: <type>
//! id: <eventId>
//! data: <JSON payload>
//! <blank line>
//! ```
//!
//! Keepalives are a comment line starting with `:` followed by a blank
//! line; conforming clients ignore them while intermediary proxies still
//! see traffic. The exact bytes here are client compatibility, so the
//! format is covered by round-trip tests and must not drift.

use serde_json::Value;
use thiserror::Error;

/// The keepalive frame. Any `:`-prefixed comment is conformant; the text
/// is fixed so tests can assert on it.
pub const KEEPALIVE_FRAME: &str = ": keep-alive\n\n";

/// Encode one event frame. `payload_json` must already be serialized JSON
/// (a single line; `serde_json::to_string` never emits raw newlines).
#[must_use]
pub fn encode_event(event_type: &str, event_id: &str, payload_json: &str) -> String {
    format!("event: {event_type}\nid: {event_id}\ndata: {payload_json}\n\n")
}

/// Whether a block is a keepalive comment rather than an event.
#[must_use]
pub fn is_keepalive(block: &str) -> bool {
    block.starts_with(':')
}

/// A parsed event frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrame {
    /// The `event:` field.
    pub event_type: String,
    /// The `id:` field.
    pub event_id: String,
    /// The decoded `data:` field.
    pub payload: Value,
}

/// Errors from [`parse_event`].
#[derive(Debug, Error)]
pub enum FrameError {
    /// A required field line is absent.
    #[error("missing `{0}:` field")]
    MissingField(&'static str),
    /// The block is a keepalive comment, not an event.
    #[error("keepalive frame carries no event")]
    Keepalive,
    /// The `data:` field is not valid JSON.
    #[error("invalid payload json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse one event block back into its fields. Used by tests and client
/// tooling; the inverse of [`encode_event`].
pub fn parse_event(block: &str) -> Result<ParsedFrame, FrameError> {
    if is_keepalive(block) {
        return Err(FrameError::Keepalive);
    }
    let mut event_type = None;
    let mut event_id = None;
    let mut data = None;
    for line in block.lines() {
        if let Some(rest) = line.strip_prefix("event: ") {
            event_type = Some(rest.to_owned());
        } else if let Some(rest) = line.strip_prefix("id: ") {
            event_id = Some(rest.to_owned());
        } else if let Some(rest) = line.strip_prefix("data: ") {
            data = Some(rest.to_owned());
        }
    }
    let event_type = event_type.ok_or(FrameError::MissingField("event"))?;
    let event_id = event_id.ok_or(FrameError::MissingField("id"))?;
    let data = data.ok_or(FrameError::MissingField("data"))?;
    Ok(ParsedFrame {
        event_type,
        event_id,
        payload: serde_json::from_str(&data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn encode_produces_exact_block() {
        let block = encode_event("task_created", "evt_1", r#"{"taskId":"t1"}"#);
        assert_eq!(block, "event: task_created\nid: evt_1\ndata: {\"taskId\":\"t1\"}\n\n");
    }

    #[test]
    fn block_ends_with_blank_line() {
        let block = encode_event("task_deleted", "evt_2", "null");
        assert!(block.ends_with("\n\n"));
    }

    #[test]
    fn keepalive_is_a_comment_with_blank_line() {
        assert!(KEEPALIVE_FRAME.starts_with(':'));
        assert!(KEEPALIVE_FRAME.ends_with("\n\n"));
        assert!(!KEEPALIVE_FRAME.contains("event:"));
        assert!(!KEEPALIVE_FRAME.contains("data:"));
    }

    #[test]
    fn is_keepalive_distinguishes_frames() {
        assert!(is_keepalive(KEEPALIVE_FRAME));
        assert!(!is_keepalive(&encode_event("task_created", "evt_1", "null")));
    }

    #[test]
    fn round_trip_preserves_fields() {
        let payload = json!({"taskId": "t1", "points": 10});
        let block = encode_event(
            "task_created",
            "evt_42",
            &serde_json::to_string(&payload).unwrap(),
        );
        let parsed = parse_event(&block).unwrap();
        assert_eq!(parsed.event_type, "task_created");
        assert_eq!(parsed.event_id, "evt_42");
        assert_eq!(parsed.payload, payload);
    }

    #[test]
    fn round_trip_null_payload() {
        let block = encode_event("streak_updated", "evt_7", "null");
        let parsed = parse_event(&block).unwrap();
        assert_eq!(parsed.payload, Value::Null);
    }

    #[test]
    fn parse_rejects_keepalive() {
        assert_matches!(parse_event(KEEPALIVE_FRAME), Err(FrameError::Keepalive));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert_matches!(
            parse_event("id: evt_1\ndata: {}\n\n"),
            Err(FrameError::MissingField("event"))
        );
        assert_matches!(
            parse_event("event: task_created\ndata: {}\n\n"),
            Err(FrameError::MissingField("id"))
        );
        assert_matches!(
            parse_event("event: task_created\nid: evt_1\n\n"),
            Err(FrameError::MissingField("data"))
        );
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let block = "event: task_created\nid: evt_1\ndata: {not json}\n\n";
        assert_matches!(parse_event(block), Err(FrameError::Json(_)));
    }

    #[test]
    fn payload_with_string_escapes_round_trips() {
        let payload = json!({"title": "line one\nline two"});
        let block = encode_event(
            "task_updated",
            "evt_9",
            &serde_json::to_string(&payload).unwrap(),
        );
        // Serialized JSON escapes the newline, so the block still has
        // exactly one data line.
        assert_eq!(block.matches("data: ").count(), 1);
        let parsed = parse_event(&block).unwrap();
        assert_eq!(parsed.payload, payload);
    }
}
