use serde::{Deserialize, Serialize};

/// One entry of the chat log.
///
/// Serialized as `{"message": ..., "origin": ...}`. Connections that did not
/// send an `Origin` header produce entries without the `origin` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "message")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ChatMessage {
    pub fn new(content: impl Into<String>, origin: Option<String>) -> Self {
        Self {
            content: content.into(),
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_shape() {
        let msg = ChatMessage::new("hello", Some("http://localhost:8000".to_string()));
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value.get("message").and_then(|v| v.as_str()), Some("hello"));
        assert_eq!(
            value.get("origin").and_then(|v| v.as_str()),
            Some("http://localhost:8000")
        );
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_chat_message_without_origin_omits_field() {
        let msg = ChatMessage::new("hi", None);
        assert_eq!(serde_json::to_string(&msg).unwrap(), r#"{"message":"hi"}"#);
    }
}
