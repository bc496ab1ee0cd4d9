// Public modules
pub mod conversation;
pub mod conversation_list;
pub mod conversation_request;
pub mod message;
pub mod model_info;
pub mod reply_event;

// Re-exports
pub use conversation::{Conversation, Node};
pub use conversation_list::{ConversationList, ConversationSummary};
pub use conversation_request::{ConversationAction, ConversationRequest, OutgoingMessage};
pub use message::{Author, Content, Message, MessageMetadata};
pub use model_info::{ModelInfo, ModelList};
pub use reply_event::ReplyEvent;
