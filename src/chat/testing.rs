//! Test doubles for driving the chat loop without a terminal or a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use futures::stream;
use serde_json::json;

use crate::chat::input::LineSource;
use crate::client::{ChatBackend, ReplyStream};
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::types::{
    Author, Content, Conversation, ConversationList, ConversationSummary, Message,
    MessageMetadata, ModelInfo, Node, ReplyEvent,
};

/////////////////////////////////////////// Input ///////////////////////////////////////////

/// Replays a fixed script of lines, then reports closed input.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

/////////////////////////////////////////// Output ///////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    UserBanner,
    AssistantBanner,
    UserText(String),
    AssistantText(String),
    Text(String),
    Title(String),
    Heading(String),
    Info(String),
    Notice(String),
    Status(String),
    Error(String),
    Sensitive(String, String),
    Newline,
    Clear,
}

/// Records everything rendered.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub outputs: Vec<Output>,
}

impl RecordingRenderer {
    pub fn errors(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Title(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Concatenation of every streamed chunk.
    pub fn streamed(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn chunks(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Text(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has(&self, output: &Output) -> bool {
        self.outputs.contains(output)
    }

    pub fn count(&self, output: &Output) -> usize {
        self.outputs.iter().filter(|o| *o == output).count()
    }
}

impl Renderer for RecordingRenderer {
    fn print_user_banner(&mut self) {
        self.outputs.push(Output::UserBanner);
    }

    fn print_assistant_banner(&mut self) {
        self.outputs.push(Output::AssistantBanner);
    }

    fn print_user_text(&mut self, text: &str) {
        self.outputs.push(Output::UserText(text.to_string()));
    }

    fn print_assistant_text(&mut self, text: &str) {
        self.outputs.push(Output::AssistantText(text.to_string()));
    }

    fn print_text(&mut self, text: &str) {
        self.outputs.push(Output::Text(text.to_string()));
    }

    fn print_title(&mut self, title: &str) {
        self.outputs.push(Output::Title(title.to_string()));
    }

    fn print_heading(&mut self, heading: &str) {
        self.outputs.push(Output::Heading(heading.to_string()));
    }

    fn print_info(&mut self, info: &str) {
        self.outputs.push(Output::Info(info.to_string()));
    }

    fn print_notice(&mut self, notice: &str) {
        self.outputs.push(Output::Notice(notice.to_string()));
    }

    fn print_status(&mut self, status: &str) {
        self.outputs.push(Output::Status(status.to_string()));
    }

    fn print_error(&mut self, error: &str) {
        self.outputs.push(Output::Error(error.to_string()));
    }

    fn print_sensitive(&mut self, label: &str, value: &str) {
        self.outputs
            .push(Output::Sensitive(label.to_string(), value.to_string()));
    }

    fn newline(&mut self) {
        self.outputs.push(Output::Newline);
    }

    fn clear_screen(&mut self) {
        self.outputs.push(Output::Clear);
    }
}

/////////////////////////////////////////// Backend //////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        offset: u64,
        limit: u64,
    },
    Get(String),
    SetTitle(String, String),
    Delete(String),
    ListModels,
    Send {
        text: String,
        model: String,
        message_id: String,
        parent_id: String,
        conversation_id: Option<String>,
    },
    Regenerate {
        text: String,
        model: String,
        conversation_id: String,
        message_id: String,
        parent_id: String,
    },
    GenerateTitle {
        conversation_id: String,
        model: String,
        message_id: String,
    },
}

/// In-memory chat service.
pub struct FakeBackend {
    conversations: Mutex<Vec<ConversationSummary>>,
    trees: HashMap<String, Conversation>,
    models: Vec<ModelInfo>,
    replies: Mutex<VecDeque<Vec<Result<ReplyEvent>>>>,
    calls: Mutex<Vec<Call>>,
    pub rename_succeeds: bool,
    pub delete_succeeds: bool,
    pub generated_title: String,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(Vec::new()),
            trees: HashMap::new(),
            models: vec![ModelInfo::new("gpt-4", "GPT-4", "Most capable")],
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            rename_succeeds: true,
            delete_succeeds: true,
            generated_title: "Generated Title".to_string(),
        }
    }

    /// Adds `count` conversations named `Chat 1`..`Chat n` with ids `c1`..`cn`.
    pub fn with_conversations(self, count: usize) -> Self {
        {
            let mut conversations = self.conversations.lock().unwrap();
            for i in 1..=count {
                conversations.push(ConversationSummary::new(format!("c{i}"), format!("Chat {i}")));
            }
        }
        self
    }

    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = models;
        self
    }

    pub fn with_tree(mut self, id: &str, tree: Conversation) -> Self {
        self.trees.insert(id.to_string(), tree);
        self
    }

    pub fn with_reply(self, events: Vec<Result<ReplyEvent>>) -> Self {
        self.replies.lock().unwrap().push_back(events);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_reply(&self) -> ReplyStream {
        let events = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Box::pin(stream::iter(events))
    }
}

#[async_trait::async_trait]
impl ChatBackend for FakeBackend {
    async fn list_conversations(&self, offset: u64, limit: u64) -> Result<ConversationList> {
        self.record(Call::List { offset, limit });
        let conversations = self.conversations.lock().unwrap();
        let total = conversations.len() as u64;
        let items = conversations
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(ConversationList {
            items,
            total,
            limit,
            offset,
        })
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.record(Call::Get(conversation_id.to_string()));
        self.trees.get(conversation_id).cloned().ok_or_else(|| {
            Error::not_found(
                "conversation not found",
                Some("conversation".to_string()),
                Some(conversation_id.to_string()),
            )
        })
    }

    async fn set_conversation_title(&self, conversation_id: &str, title: &str) -> Result<bool> {
        self.record(Call::SetTitle(conversation_id.to_string(), title.to_string()));
        if self.rename_succeeds {
            for conversation in self.conversations.lock().unwrap().iter_mut() {
                if conversation.id == conversation_id {
                    conversation.title = title.to_string();
                }
            }
        }
        Ok(self.rename_succeeds)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool> {
        self.record(Call::Delete(conversation_id.to_string()));
        if self.delete_succeeds {
            self.conversations
                .lock()
                .unwrap()
                .retain(|c| c.id != conversation_id);
        }
        Ok(self.delete_succeeds)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.record(Call::ListModels);
        Ok(self.models.clone())
    }

    async fn send_message(
        &self,
        text: &str,
        model_slug: &str,
        message_id: &str,
        parent_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<ReplyStream> {
        self.record(Call::Send {
            text: text.to_string(),
            model: model_slug.to_string(),
            message_id: message_id.to_string(),
            parent_id: parent_id.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        });
        Ok(self.next_reply())
    }

    async fn regenerate_reply(
        &self,
        text: &str,
        model_slug: &str,
        conversation_id: &str,
        message_id: &str,
        parent_id: &str,
    ) -> Result<ReplyStream> {
        self.record(Call::Regenerate {
            text: text.to_string(),
            model: model_slug.to_string(),
            conversation_id: conversation_id.to_string(),
            message_id: message_id.to_string(),
            parent_id: parent_id.to_string(),
        });
        Ok(self.next_reply())
    }

    async fn generate_title(
        &self,
        conversation_id: &str,
        model_slug: &str,
        message_id: &str,
    ) -> Result<String> {
        self.record(Call::GenerateTitle {
            conversation_id: conversation_id.to_string(),
            model: model_slug.to_string(),
            message_id: message_id.to_string(),
        });
        Ok(self.generated_title.clone())
    }

    fn access_token(&self) -> &str {
        "secret-token"
    }
}

/////////////////////////////////////////// Builders /////////////////////////////////////////

pub fn message(id: &str, role: &str, text: &str, model_slug: Option<&str>) -> Message {
    Message {
        id: id.to_string(),
        author: Some(Author {
            role: role.to_string(),
        }),
        role: None,
        content: Content::text(text),
        metadata: MessageMetadata {
            model_slug: model_slug.map(str::to_string),
        },
        end_turn: None,
    }
}

/// A reply event carrying the accumulated assistant text.
pub fn reply(id: &str, text: &str, conversation_id: &str, end_turn: bool) -> Result<ReplyEvent> {
    let mut message = message(id, "assistant", text, None);
    message.end_turn = Some(end_turn);
    Ok(ReplyEvent::new(message, conversation_id))
}

pub fn reply_error(payload: &str) -> Result<ReplyEvent> {
    Ok(ReplyEvent::failed(json!(payload)))
}

/// `root -> a (user) -> b (assistant)`, current node `b`.
pub fn two_turn_tree(title: &str) -> Conversation {
    let mut mapping = HashMap::new();
    mapping.insert(
        "root".to_string(),
        Node {
            id: "root".to_string(),
            parent: None,
            children: vec!["a".to_string()],
            message: None,
        },
    );
    mapping.insert(
        "a".to_string(),
        Node {
            id: "a".to_string(),
            parent: Some("root".to_string()),
            children: vec!["b".to_string()],
            message: Some(message("a", "user", "What is Rust?", None)),
        },
    );
    mapping.insert(
        "b".to_string(),
        Node {
            id: "b".to_string(),
            parent: Some("a".to_string()),
            children: Vec::new(),
            message: Some(message(
                "b",
                "assistant",
                "A systems programming language.",
                Some("gpt-4"),
            )),
        },
    );
    Conversation {
        title: title.to_string(),
        current_node: "b".to_string(),
        mapping,
    }
}
