//! Folding a streamed reply into the session.
//!
//! Each event carries the whole reply generated so far. A [`ReplyCursor`] remembers
//! how much has been shown so only the new tail is printed, which works whether the
//! server resends the full text or not.

use std::time::Instant;

use futures::StreamExt;

use crate::chat::state::SessionState;
use crate::client::ReplyStream;
use crate::error::{Error, Result};
use crate::observability::STREAM_DURATION;
use crate::render::Renderer;

/// Tracks how many characters of a reply have been emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplyCursor {
    emitted: usize,
}

impl ReplyCursor {
    /// Characters emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Returns the part of `full` beyond what was already emitted and moves past it.
    pub fn advance<'a>(&mut self, full: &'a str) -> &'a str {
        let start = full
            .char_indices()
            .nth(self.emitted)
            .map(|(index, _)| index)
            .unwrap_or(full.len());
        let suffix = &full[start..];
        self.emitted += suffix.chars().count();
        suffix
    }
}

/// Consumes `events`, printing the reply as it grows and recording it in `state`.
///
/// An event with a non-empty error payload aborts with [`Error::Generation`] and an event
/// without a message aborts with [`Error::MalformedStream`]; in both cases `state`
/// keeps whatever the previous events left in it.
///
/// # Examples
///
/// ```
/// # use colloquy::chat::{SessionState, reconcile_reply};
/// # use colloquy::{Message, PlainTextRenderer, ReplyEvent, ReplyStream};
/// # tokio_test::block_on(async {
/// let reply: Message = serde_json::from_str(
///     r#"{"id": "r1", "author": {"role": "assistant"}, "content": {"parts": ["Hi!"]}}"#,
/// )
/// .unwrap();
/// let events: ReplyStream =
///     Box::pin(futures::stream::iter(vec![Ok(ReplyEvent::new(reply, "conv-1"))]));
///
/// let mut state = SessionState::new_chat("gpt-4");
/// let mut renderer = PlainTextRenderer::with_color(false);
/// reconcile_reply(events, &mut state, &mut renderer).await.unwrap();
/// assert_eq!(state.conversation_id.as_deref(), Some("conv-1"));
/// assert_eq!(state.assistant_prompt.own_id, "r1");
/// # });
/// ```
pub async fn reconcile_reply(
    mut events: ReplyStream,
    state: &mut SessionState,
    renderer: &mut dyn Renderer,
) -> Result<()> {
    let started = Instant::now();
    let mut cursor = ReplyCursor::default();

    while let Some(event) = events.next().await {
        let event = event?;
        if let Some(error) = event.error_payload() {
            return Err(Error::generation(error.clone()));
        }
        let Some(message) = event.message else {
            return Err(Error::malformed_stream("reply event has no message"));
        };

        let suffix = cursor.advance(message.text());
        if !suffix.is_empty() {
            renderer.print_text(suffix);
        }

        if let Some(conversation_id) = event.conversation_id {
            state.conversation_id = Some(conversation_id);
        }
        state.assistant_prompt.text = message.text().to_string();
        state.assistant_prompt.parent_id = state.user_prompt.own_id.clone();
        state.assistant_prompt.own_id = message.id.clone();

        if message.ends_turn() {
            renderer.newline();
        }
    }
    renderer.newline();

    STREAM_DURATION.add(started.elapsed().as_secs_f64());
    Ok(())
}
