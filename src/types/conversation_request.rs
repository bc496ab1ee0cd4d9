use serde::{Deserialize, Serialize};

use crate::types::{Author, Content};

/// What the server should do with a conversation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationAction {
    /// Append a user message and answer it.
    Next,
    /// Produce another answer to an existing user message.
    Variant,
}

/// A user message sent to the conversation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Client-generated message id.
    pub id: String,

    /// Always the user.
    pub author: Author,

    /// The message text.
    pub content: Content,
}

impl OutgoingMessage {
    /// A user message with the given id and text.
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: Author {
                role: "user".to_string(),
            },
            content: Content::text(text),
        }
    }
}

/// Body of a streamed conversation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRequest {
    /// Send a new message or regenerate.
    pub action: ConversationAction,

    /// The user message being answered.
    pub messages: Vec<OutgoingMessage>,

    /// Model slug.
    pub model: String,

    /// The node the user message hangs off.
    pub parent_message_id: String,

    /// Absent for a conversation that does not exist yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ConversationRequest {
    /// Request an answer to a new user message.
    pub fn next(
        text: &str,
        model: &str,
        message_id: &str,
        parent_id: &str,
        conversation_id: Option<&str>,
    ) -> Self {
        Self {
            action: ConversationAction::Next,
            messages: vec![OutgoingMessage::user(message_id, text)],
            model: model.to_string(),
            parent_message_id: parent_id.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        }
    }

    /// Request another answer to an existing user message.
    pub fn variant(
        text: &str,
        model: &str,
        conversation_id: &str,
        message_id: &str,
        parent_id: &str,
    ) -> Self {
        Self {
            action: ConversationAction::Variant,
            messages: vec![OutgoingMessage::user(message_id, text)],
            model: model.to_string(),
            parent_message_id: parent_id.to_string(),
            conversation_id: Some(conversation_id.to_string()),
        }
    }
}
