use serde::{Deserialize, Serialize};

/// A model the user may chat with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Short identifier sent with every message.
    pub slug: String,

    /// Human-readable name.
    #[serde(default)]
    pub title: String,

    /// One-line description.
    #[serde(default)]
    pub description: String,

    /// Context size advertised for the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelInfo {
    /// Create a new `ModelInfo`.
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: description.into(),
            max_tokens: None,
        }
    }
}

/// Response from the models endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    /// The available models.
    pub models: Vec<ModelInfo>,
}
