use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// `user`, `assistant`, `system` or `tool`.
    pub role: String,
}

/// Message body.
///
/// Parts are kept as raw JSON because non-text parts (images, code results) share
/// the array with plain strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Content type, usually `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// The content parts.
    #[serde(default)]
    pub parts: Vec<serde_json::Value>,
}

impl Content {
    /// Text content with a single part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: Some("text".to_string()),
            parts: vec![serde_json::Value::String(text.into())],
        }
    }
}

/// Metadata attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// The model that produced (or was asked to answer) the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_slug: Option<String>,
}

/// A message stored in a conversation node or carried by a reply event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier. Equal to the id of the node that holds it.
    #[serde(default)]
    pub id: String,

    /// Author of the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    /// Older payloads put the role directly on the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Message body.
    #[serde(default)]
    pub content: Content,

    /// Message metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: MessageMetadata,

    /// Set on the last message of an assistant turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_turn: Option<bool>,
}

impl Message {
    /// The author's role, preferring `author.role` over the legacy `role` field.
    pub fn role(&self) -> &str {
        self.author
            .as_ref()
            .map(|author| author.role.as_str())
            .or(self.role.as_deref())
            .unwrap_or("")
    }

    /// True when the author is the user.
    pub fn is_user(&self) -> bool {
        self.role() == "user"
    }

    /// The text of the first content part, or the empty string.
    pub fn text(&self) -> &str {
        self.content
            .parts
            .first()
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    /// The model slug recorded in the metadata, if any.
    pub fn model_slug(&self) -> Option<&str> {
        self.metadata.model_slug.as_deref()
    }

    /// True when this message closes the assistant's turn.
    pub fn ends_turn(&self) -> bool {
        self.end_turn.unwrap_or(false)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
