//! The interactive chat loop.
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`state`]: the conversation position a session tracks
//! - [`input`]: reading messages, commands and menu answers
//! - [`selector`]: conversation and model menus
//! - [`commands`]: slash command parsing
//! - [`history`]: walking a fetched conversation
//! - [`reconcile`]: folding streamed replies into the session
//! - [`controller`]: the loop itself

mod commands;
mod config;
mod controller;
mod history;
mod input;
mod reconcile;
mod selector;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_MODEL_SLUG, DEFAULT_PAGE_SIZE};
pub use controller::{Stage, TurnController};
pub use history::{Turn, walk_history};
pub use input::{EditorSource, InputFramer, LineSource, ask, ask_choice, confirm, read_unit};
pub use reconcile::{ReplyCursor, reconcile_reply};
pub use selector::{
    MAX_TITLE_LEN, Selection, TitleChange, choose_model, delete_conversation,
    rename_conversation, select_conversation, validate_title,
};
pub use state::{NEW_CHAT_TITLE, NOT_CREATED, PromptRecord, SessionState};
