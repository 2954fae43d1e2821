//! Wire types for the conversation endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/conversation/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub document_ids: Vec<i64>,
}

/// The part of the create response the client relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationCreated {
    pub id: i64,
}

/// One streamed chat event.
///
/// The payload shape belongs to the backend, so the raw JSON is kept and the
/// common `{"role": ..., "text": ...}` fields are exposed as accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent(pub Value);

impl ChatEvent {
    pub fn parse(payload: &str) -> crate::Result<Self> {
        Ok(Self(serde_json::from_str(payload)?))
    }

    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_event_accessors() {
        let event = ChatEvent::parse(r#"{"role":"assistant","text":"a"}"#).unwrap();
        assert_eq!(event.role(), Some("assistant"));
        assert_eq!(event.text(), Some("a"));
    }

    #[test]
    fn test_chat_event_other_shape() {
        let event = ChatEvent::parse(r#"{"type":"done"}"#).unwrap();
        assert_eq!(event.role(), None);
        assert_eq!(event.text(), None);
        assert_eq!(event.into_value()["type"], "done");
    }

    #[test]
    fn test_chat_event_invalid_json() {
        let err = ChatEvent::parse("not json").unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_create_request_shape() {
        let body = serde_json::to_value(CreateConversationRequest {
            document_ids: vec![3],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"document_ids": [3]}));
    }
}
