//! The turn controller: the chat loop as an explicit state machine.
//!
//! A run starts in the conversation menu, moves to loading or creating a
//! conversation, then talks until a command sends it elsewhere:
//!
//! ```text
//! Selecting --pick--> Loading(id) --+
//!     |                             +--> Talking --/select, /del--> Selecting
//!     +----new-----> Creating ------+       |----/reload----------> Loading(id)
//!                                           |----/new-------------> Creating
//!                                           +----/quit, EOF-------> Exiting
//! ```

use crate::chat::commands::{ChatCommand, help_text, parse_command};
use crate::chat::config::ChatConfig;
use crate::chat::history::walk_history;
use crate::chat::input::{LineSource, read_unit};
use crate::chat::reconcile::reconcile_reply;
use crate::chat::selector::{
    Selection, TitleChange, choose_model, delete_conversation, rename_conversation,
    select_conversation,
};
use crate::chat::state::{PromptRecord, SessionState};
use crate::client::ChatBackend;
use crate::error::{Error, Result};
use crate::observability::{
    CONVERSATIONS_LOADED, MESSAGES_REGENERATED, MESSAGES_SENT, TITLES_GENERATED,
};
use crate::render::Renderer;

/// Label printed above the access token.
const TOKEN_LABEL: &str = "Your access token (keep it private)";

/// Where the controller goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Show the conversation menu.
    Selecting,
    /// Fetch and replay a conversation.
    Loading(String),
    /// Pick a model and start a conversation.
    Creating,
    /// Read and answer input.
    Talking(SessionState),
    /// Leave.
    Exiting,
}

/// Drives one interactive session against a chat backend.
pub struct TurnController<'a> {
    backend: &'a dyn ChatBackend,
    input: &'a mut dyn LineSource,
    renderer: &'a mut dyn Renderer,
    config: ChatConfig,
}

impl<'a> TurnController<'a> {
    pub fn new(
        backend: &'a dyn ChatBackend,
        input: &'a mut dyn LineSource,
        renderer: &'a mut dyn Renderer,
        config: ChatConfig,
    ) -> Self {
        Self {
            backend,
            input,
            renderer,
            config,
        }
    }

    /// Runs until the user quits.
    ///
    /// Returns `Ok(())` on a requested exit. Remote failures and data that cannot be
    /// reconciled end the run with an error.
    pub async fn run(&mut self) -> Result<()> {
        let mut stage = Stage::Selecting;
        loop {
            stage = match stage {
                Stage::Selecting => self.select().await?,
                Stage::Loading(conversation_id) => {
                    Stage::Talking(self.load_conversation(&conversation_id).await?)
                }
                Stage::Creating => match self.new_conversation().await? {
                    Some(state) => Stage::Talking(state),
                    None => Stage::Exiting,
                },
                Stage::Talking(state) => self.talk_loop(state).await?,
                Stage::Exiting => {
                    self.renderer.print_info("Bye...");
                    return Ok(());
                }
            };
        }
    }

    async fn select(&mut self) -> Result<Stage> {
        let selection = select_conversation(
            self.backend,
            &mut *self.input,
            &mut *self.renderer,
            self.config.page_size,
        )
        .await?;
        Ok(match selection {
            Selection::Conversation(summary) => Stage::Loading(summary.id),
            Selection::New => Stage::Creating,
            Selection::Exit => Stage::Exiting,
        })
    }

    /// Fetches a conversation, replays its history and returns the seeded state.
    pub async fn load_conversation(&mut self, conversation_id: &str) -> Result<SessionState> {
        let conversation = self.backend.get_conversation(conversation_id).await?;
        let turns = walk_history(&conversation)?;

        let mut state = SessionState::existing(conversation_id, self.config.default_model.clone());
        state.title = Some(conversation.title.clone());
        self.renderer.print_title(state.title());

        for turn in turns {
            let message = turn.message;
            if let Some(slug) = message.model_slug() {
                state.model_slug = slug.to_string();
            }
            let record = if message.is_user() {
                self.renderer.print_user_banner();
                self.renderer.print_user_text(message.text());
                &mut state.user_prompt
            } else {
                self.renderer.print_assistant_banner();
                self.renderer.print_assistant_text(message.text());
                &mut state.assistant_prompt
            };
            record.text = message.text().to_string();
            record.parent_id = turn.parent_id.to_string();
            record.own_id = turn.node_id.to_string();
            self.renderer.newline();
        }

        CONVERSATIONS_LOADED.click();
        Ok(state)
    }

    /// Picks a model and returns the state of a conversation not yet created remotely.
    ///
    /// Returns `Ok(None)` when the input was closed.
    pub async fn new_conversation(&mut self) -> Result<Option<SessionState>> {
        let Some(model) = choose_model(self.backend, &mut *self.input, &mut *self.renderer).await?
        else {
            return Ok(None);
        };
        let state = SessionState::new_chat(model.slug);
        self.renderer.print_title(state.title());
        Ok(Some(state))
    }

    async fn talk_loop(&mut self, mut state: SessionState) -> Result<Stage> {
        loop {
            self.renderer.print_user_banner();
            let Some(unit) = read_unit(&mut *self.input)? else {
                return Ok(Stage::Exiting);
            };
            if unit.is_empty() {
                continue;
            }
            if unit.starts_with('/') {
                if let Some(next) = self.dispatch(&unit, &mut state).await? {
                    return Ok(next);
                }
                continue;
            }
            self.talk(&mut state, &unit).await?;
        }
    }

    /// Runs one slash command. Returns the next stage when the command leaves the
    /// current conversation.
    async fn dispatch(&mut self, unit: &str, state: &mut SessionState) -> Result<Option<Stage>> {
        let command = parse_command(unit).unwrap_or(ChatCommand::Help);
        match command {
            ChatCommand::Quit => return Ok(Some(Stage::Exiting)),
            ChatCommand::Delete => {
                let Some(conversation_id) = self.conversation_id(state) else {
                    return Ok(None);
                };
                match delete_conversation(
                    self.backend,
                    &mut *self.input,
                    &mut *self.renderer,
                    &conversation_id,
                )
                .await?
                {
                    None => return Ok(Some(Stage::Exiting)),
                    Some(true) => return Ok(Some(Stage::Selecting)),
                    Some(false) => {}
                }
            }
            ChatCommand::Title => {
                let Some(conversation_id) = self.conversation_id(state) else {
                    return Ok(None);
                };
                match rename_conversation(
                    self.backend,
                    &mut *self.input,
                    &mut *self.renderer,
                    &conversation_id,
                )
                .await?
                {
                    None => return Ok(Some(Stage::Exiting)),
                    Some(TitleChange::Renamed(title)) => state.title = Some(title),
                    Some(TitleChange::Unchanged) => {}
                }
            }
            ChatCommand::Select => return Ok(Some(Stage::Selecting)),
            ChatCommand::Reload => {
                if let Some(conversation_id) = self.conversation_id(state) {
                    return Ok(Some(Stage::Loading(conversation_id)));
                }
            }
            ChatCommand::New => return Ok(Some(Stage::Creating)),
            ChatCommand::Regenerate => self.regenerate(state).await?,
            ChatCommand::Token => {
                let token = self.backend.access_token();
                self.renderer.print_sensitive(TOKEN_LABEL, token);
            }
            ChatCommand::Clear => {
                self.renderer.clear_screen();
                self.renderer.print_title(state.title());
            }
            ChatCommand::Version => {
                self.renderer
                    .print_status(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
                self.renderer.newline();
            }
            ChatCommand::Help => {
                for line in help_text().lines() {
                    self.renderer.print_info(line);
                }
                self.renderer.newline();
            }
        }
        Ok(None)
    }

    /// The conversation id, or `None` after telling the user there is none yet.
    fn conversation_id(&mut self, state: &SessionState) -> Option<String> {
        match state.require_conversation_id() {
            Ok(conversation_id) => Some(conversation_id.to_string()),
            Err(err) => {
                self.renderer.print_error(&err.to_string());
                None
            }
        }
    }

    /// Sends `text` as the next user turn and streams the reply.
    async fn talk(&mut self, state: &mut SessionState, text: &str) -> Result<()> {
        self.renderer.print_assistant_banner();

        let first_message = !state.is_persisted();
        state.user_prompt = PromptRecord::reply_to(text, state.assistant_prompt.own_id.clone());

        let events = self
            .backend
            .send_message(
                text,
                &state.model_slug,
                &state.user_prompt.own_id,
                &state.user_prompt.parent_id,
                state.conversation_id.as_deref(),
            )
            .await?;
        MESSAGES_SENT.click();
        reconcile_reply(events, state, &mut *self.renderer).await?;

        if first_message {
            let Some(conversation_id) = state.conversation_id.clone() else {
                return Err(Error::malformed_stream(
                    "reply did not name its conversation",
                ));
            };
            let title = self
                .backend
                .generate_title(
                    &conversation_id,
                    &state.model_slug,
                    &state.assistant_prompt.own_id,
                )
                .await?;
            TITLES_GENERATED.click();
            self.renderer
                .print_status(&format!("Title generated: {title}"));
            state.title = Some(title);
        }
        Ok(())
    }

    /// Asks for another answer to the last user turn.
    async fn regenerate(&mut self, state: &mut SessionState) -> Result<()> {
        let Some(conversation_id) = self.conversation_id(state) else {
            return Ok(());
        };
        let events = self
            .backend
            .regenerate_reply(
                &state.user_prompt.text,
                &state.model_slug,
                &conversation_id,
                &state.user_prompt.own_id,
                &state.user_prompt.parent_id,
            )
            .await?;
        MESSAGES_REGENERATED.click();

        self.renderer.newline();
        self.renderer.print_assistant_banner();
        reconcile_reply(events, state, &mut *self.renderer).await
    }
}
