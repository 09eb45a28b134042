//! Push-channel frame decoding

use serde::Deserialize;
use thiserror::Error;

use super::{StatusUpdate, StreamEvent};

pub const EVENT_CONNECTION_STATUS: &str = "connection_status";
pub const EVENT_NEW_DATA: &str = "new_data";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("connection_status event without a string 'status'")]
    MissingStatus,
}

/// Accepts `{"event": .., "data": ..}` or the Socket.IO array form `[event, data]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Object {
        event: String,
        #[serde(default)]
        data: serde_json::Value,
    },
    Array((String, serde_json::Value)),
}

/// Decodes one text frame. `Ok(None)` for events this client does not consume.
pub fn parse_frame(text: &str) -> Result<Option<StreamEvent>, FrameError> {
    let (event, data) = match serde_json::from_str::<Envelope>(text)? {
        Envelope::Object { event, data } => (event, data),
        Envelope::Array((event, data)) => (event, data),
    };

    match event.as_str() {
        EVENT_CONNECTION_STATUS => {
            let status = data
                .get("status")
                .and_then(|s| s.as_str())
                .ok_or(FrameError::MissingStatus)?;
            Ok(Some(StreamEvent::Status(StatusUpdate::Reported(
                status.to_string(),
            ))))
        }
        EVENT_NEW_DATA => Ok(Some(StreamEvent::Data(data))),
        other => {
            tracing::debug!(event = other, "Ignoring push event");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object_envelope() {
        let text = r#"{"event": "connection_status", "data": {"status": "connected"}}"#;
        match parse_frame(text).unwrap() {
            Some(StreamEvent::Status(StatusUpdate::Reported(s))) => assert_eq!(s, "connected"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_envelope() {
        let text = r#"["new_data", {"throughput": 1.0, "pdr": 0.5, "eed": 2.0, "formatted_time": "10:00:00"}]"#;
        match parse_frame(text).unwrap() {
            Some(StreamEvent::Data(v)) => assert_eq!(v["pdr"], json!(0.5)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert!(parse_frame(r#"{"event": "heartbeat"}"#).unwrap().is_none());
    }

    #[test]
    fn test_malformed_frames() {
        assert!(matches!(parse_frame("not json"), Err(FrameError::Json(_))));
        assert!(matches!(
            parse_frame(r#"{"event": "connection_status", "data": {}}"#),
            Err(FrameError::MissingStatus)
        ));
    }
}
