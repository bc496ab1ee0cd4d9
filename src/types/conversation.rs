use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// A node of the conversation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier.
    pub id: String,

    /// The preceding node; `None` only for the root.
    #[serde(default)]
    pub parent: Option<String>,

    /// Nodes answering this one. Branches appear when replies were regenerated.
    #[serde(default)]
    pub children: Vec<String>,

    /// The message held by the node. The root carries none.
    #[serde(default)]
    pub message: Option<Message>,
}

/// A full conversation as returned by the conversation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Display title.
    #[serde(default)]
    pub title: String,

    /// The leaf of the branch the user last looked at.
    pub current_node: String,

    /// Every node of the tree, keyed by id.
    pub mapping: HashMap<String, Node>,
}
