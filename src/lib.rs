//! A terminal client for ChatGPT conversations.
//!
//! The [`chat`] module holds the interactive loop; it talks to the service through
//! the [`ChatBackend`] trait, which [`ChatGpt`] implements over HTTP.

// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod token;
pub mod types;

// Re-exports
pub use client::{ACCESS_TOKEN_ENV, ChatBackend, ChatGpt, ReplyStream};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
