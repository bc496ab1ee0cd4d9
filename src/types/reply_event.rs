use serde::{Deserialize, Serialize};

use crate::types::Message;

/// One event of a streamed reply.
///
/// Every event carries the full text generated so far, not a delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyEvent {
    /// The assistant message as generated so far.
    #[serde(default)]
    pub message: Option<Message>,

    /// The conversation the reply belongs to; assigned by the server for new chats.
    #[serde(default)]
    pub conversation_id: Option<String>,

    /// Error payload; a truthy value aborts the reply, see [`ReplyEvent::error_payload`].
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ReplyEvent {
    /// An event carrying `message` for `conversation_id`.
    pub fn new(message: Message, conversation_id: impl Into<String>) -> Self {
        Self {
            message: Some(message),
            conversation_id: Some(conversation_id.into()),
            error: None,
        }
    }

    /// An event reporting a generation error.
    pub fn failed(error: serde_json::Value) -> Self {
        Self {
            message: None,
            conversation_id: None,
            error: Some(error),
        }
    }

    /// The error payload, unless it is null, `false`, zero or empty.
    pub fn error_payload(&self) -> Option<&serde_json::Value> {
        self.error.as_ref().filter(|error| is_truthy(error))
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
