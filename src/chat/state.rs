//! Conversation state for one chat session.
//!
//! A [`SessionState`] tracks where the session sits in the remote conversation tree:
//! which conversation, which model, and the two most recent turns. Each turn is a
//! [`PromptRecord`] linking its own node id to its parent's.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Title given to a conversation before the service names it.
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Message shown when a command needs a conversation that was never created.
pub const NOT_CREATED: &str = "Conversation has not been created.";

/// One turn's text and its position in the conversation tree.
///
/// Both ids are always populated; any id not supplied at construction is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    /// The turn's text. Empty until the turn happens.
    pub text: String,
    /// This node's id.
    pub own_id: String,
    /// The id of the node this one answers.
    pub parent_id: String,
}

impl PromptRecord {
    /// Creates a record, generating whichever ids are missing.
    pub fn new(text: Option<String>, parent_id: Option<String>, own_id: Option<String>) -> Self {
        Self {
            text: text.unwrap_or_default(),
            parent_id: parent_id.unwrap_or_else(Self::generate_id),
            own_id: own_id.unwrap_or_else(Self::generate_id),
        }
    }

    /// Creates a user turn answering `parent_id`.
    pub fn reply_to(text: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::new(Some(text.into()), Some(parent_id.into()), None)
    }

    /// Generates a fresh node id.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

impl Default for PromptRecord {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// The state of the conversation currently being talked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Display title.
    pub title: Option<String>,
    /// Remote id; `None` until the first message creates the conversation.
    pub conversation_id: Option<String>,
    /// Model every message is sent to.
    pub model_slug: String,
    /// The most recent user turn.
    pub user_prompt: PromptRecord,
    /// The most recent assistant turn.
    pub assistant_prompt: PromptRecord,
}

impl SessionState {
    /// State for a conversation that does not exist remotely yet.
    pub fn new_chat(model_slug: impl Into<String>) -> Self {
        Self {
            title: Some(NEW_CHAT_TITLE.to_string()),
            conversation_id: None,
            model_slug: model_slug.into(),
            user_prompt: PromptRecord::default(),
            assistant_prompt: PromptRecord::default(),
        }
    }

    /// State for an existing conversation, before its history is replayed.
    pub fn existing(conversation_id: impl Into<String>, model_slug: impl Into<String>) -> Self {
        Self {
            title: None,
            conversation_id: Some(conversation_id.into()),
            model_slug: model_slug.into(),
            user_prompt: PromptRecord::default(),
            assistant_prompt: PromptRecord::default(),
        }
    }

    /// The title, or the empty string when none is known.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// True once the conversation exists on the server.
    pub fn is_persisted(&self) -> bool {
        self.conversation_id.is_some()
    }

    /// The conversation id, or a precondition error when it was never created.
    pub fn require_conversation_id(&self) -> Result<&str> {
        self.conversation_id
            .as_deref()
            .ok_or_else(|| Error::precondition(NOT_CREATED))
    }
}
