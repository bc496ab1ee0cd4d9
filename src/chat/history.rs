//! Reconstructing the visible history of a fetched conversation.

use crate::error::{Error, Result};
use crate::types::{Conversation, Message};

/// One turn on the path from the root to the current node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn<'a> {
    pub node_id: &'a str,
    pub parent_id: &'a str,
    pub message: &'a Message,
}

/// Walks from `current_node` back to the root and returns the turns in
/// conversation order. The root, the node with no parent or an empty one, carries
/// no message and is not included.
///
/// A node missing from the mapping, a non-root node without a message, or a parent
/// chain that loops fails with [`Error::MalformedConversation`].
pub fn walk_history(conversation: &Conversation) -> Result<Vec<Turn<'_>>> {
    let mut turns = Vec::new();
    let mut node_id = conversation.current_node.as_str();
    loop {
        let Some(node) = conversation.mapping.get(node_id) else {
            return Err(Error::malformed_conversation(
                "node missing from mapping",
                Some(node_id.to_string()),
            ));
        };
        let Some(parent_id) = node.parent.as_deref().filter(|p| !p.is_empty()) else {
            break;
        };
        let Some(message) = node.message.as_ref() else {
            return Err(Error::malformed_conversation(
                "node has no message",
                Some(node.id.clone()),
            ));
        };
        if turns.len() >= conversation.mapping.len() {
            return Err(Error::malformed_conversation(
                "parent chain does not reach the root",
                Some(node.id.clone()),
            ));
        }
        turns.push(Turn {
            node_id: node.id.as_str(),
            parent_id,
            message,
        });
        node_id = parent_id;
    }
    turns.reverse();
    Ok(turns)
}
