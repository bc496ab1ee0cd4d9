//! Menus for picking a conversation or a model.
//!
//! The conversation menu pages through the remote listing and lets the user rename
//! or delete entries without leaving it.

use crate::chat::input::{LineSource, ask, ask_choice, confirm};
use crate::client::ChatBackend;
use crate::error::{Error, Result};
use crate::observability::{CONVERSATIONS_DELETED, CONVERSATIONS_RENAMED};
use crate::render::Renderer;
use crate::types::{ConversationSummary, ModelInfo};

/// Longest title the service accepts, in characters.
pub const MAX_TITLE_LEN: usize = 64;

const TITLE_TOO_LONG: &str = "Title too long.";

/// What the user picked in the conversation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Continue an existing conversation.
    Conversation(ConversationSummary),
    /// Start a new conversation.
    New,
    /// The user closed the input.
    Exit,
}

/// Outcome of a rename prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleChange {
    /// The service accepted the new title.
    Renamed(String),
    /// The title was rejected locally or by the service.
    Unchanged,
}

/// Checks a title against [`MAX_TITLE_LEN`].
pub fn validate_title(title: &str) -> Result<()> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(TITLE_TOO_LONG, Some("title".to_string())));
    }
    Ok(())
}

/// Prompts for a new title and stores it remotely.
///
/// Returns `Ok(None)` when the input was closed.
pub async fn rename_conversation(
    backend: &dyn ChatBackend,
    input: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
    conversation_id: &str,
) -> Result<Option<TitleChange>> {
    let Some(title) = ask(input, "New title")? else {
        return Ok(None);
    };
    if let Err(Error::Validation { message, .. }) = validate_title(&title) {
        renderer.print_error(&message);
        return Ok(Some(TitleChange::Unchanged));
    }

    if backend.set_conversation_title(conversation_id, &title).await? {
        CONVERSATIONS_RENAMED.click();
        renderer.print_status("Set title success.");
        Ok(Some(TitleChange::Renamed(title)))
    } else {
        renderer.print_error("Set title failed.");
        Ok(Some(TitleChange::Unchanged))
    }
}

/// Asks for confirmation, then deletes the conversation.
///
/// Returns `Ok(Some(true))` only when the conversation is gone, and `Ok(None)` when
/// the input was closed.
pub async fn delete_conversation(
    backend: &dyn ChatBackend,
    input: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
    conversation_id: &str,
) -> Result<Option<bool>> {
    match confirm(input, renderer, "Are you sure?", false)? {
        None => return Ok(None),
        Some(false) => return Ok(Some(false)),
        Some(true) => {}
    }

    if backend.delete_conversation(conversation_id).await? {
        CONVERSATIONS_DELETED.click();
        Ok(Some(true))
    } else {
        renderer.print_error("Delete conversation failed.");
        Ok(Some(false))
    }
}

/// Runs the paginated conversation menu.
///
/// An empty account goes straight to [`Selection::New`].
pub async fn select_conversation(
    backend: &dyn ChatBackend,
    input: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
    page_size: u64,
) -> Result<Selection> {
    let page_size = page_size.max(1);
    let mut page: u64 = 1;
    loop {
        let listing = backend
            .list_conversations((page - 1) * page_size, page_size)
            .await?;
        if listing.total == 0 {
            return Ok(Selection::New);
        }
        if listing.items.is_empty() && page > 1 {
            // The last entry of a trailing page was deleted.
            page -= 1;
            continue;
        }

        let mut choices = vec!["c".to_string()];
        renderer.print_heading(&format!("Choice conversation (Page {page}):"));
        for (index, item) in listing.items.iter().enumerate() {
            let number = index + 1;
            choices.push(number.to_string());
            choices.push(format!("t{number}"));
            choices.push(format!("d{number}"));
            renderer.print_info(&format!("  {number}. {}", item.title));
        }
        if !listing.is_last_page() {
            choices.push("n".to_string());
            renderer.print_notice("  n. >> Next page");
        }
        if !listing.is_first_page() {
            choices.push("p".to_string());
            renderer.print_notice("  p. << Previous page");
        }
        renderer.print_notice("  t?. Set title for the conversation, eg: t1");
        renderer.print_notice("  d?. Delete the conversation, eg: d1");
        renderer.print_notice("  c. ** Start new chat");

        let Some(choice) = ask_choice(input, renderer, "Your choice", &choices, None)? else {
            return Ok(Selection::Exit);
        };
        match choice.as_str() {
            "c" => return Ok(Selection::New),
            "n" => {
                page += 1;
                continue;
            }
            "p" => {
                page -= 1;
                continue;
            }
            _ => {}
        }

        if let Some(number) = choice.strip_prefix('t') {
            let item = item_at(&listing.items, number)?;
            if rename_conversation(backend, input, renderer, &item.id)
                .await?
                .is_none()
            {
                return Ok(Selection::Exit);
            }
            continue;
        }
        if let Some(number) = choice.strip_prefix('d') {
            let item = item_at(&listing.items, number)?;
            if delete_conversation(backend, input, renderer, &item.id)
                .await?
                .is_none()
            {
                return Ok(Selection::Exit);
            }
            continue;
        }

        return Ok(Selection::Conversation(
            item_at(&listing.items, &choice)?.clone(),
        ));
    }
}

fn item_at<'a>(items: &'a [ConversationSummary], number: &str) -> Result<&'a ConversationSummary> {
    number
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| items.get(index))
        .ok_or_else(|| Error::input(format!("no conversation numbered {number}")))
}

/// Picks the model for a new conversation.
///
/// A lone model is chosen without asking. Returns `Ok(None)` when the input was closed.
pub async fn choose_model(
    backend: &dyn ChatBackend,
    input: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
) -> Result<Option<ModelInfo>> {
    let mut models = backend.list_models().await?;
    if models.is_empty() {
        return Err(Error::not_found(
            "No models are available",
            Some("model".to_string()),
            None,
        ));
    }
    if models.len() == 1 {
        return Ok(models.pop());
    }

    let mut choices = Vec::with_capacity(models.len());
    renderer.print_heading("Choice model:");
    for (index, model) in models.iter().enumerate() {
        let number = index + 1;
        choices.push(number.to_string());
        renderer.print_info(&format!(
            "  {number}. {} - {}",
            model.title, model.description
        ));
    }

    let Some(choice) = ask_choice(input, renderer, "Your choice", &choices, None)? else {
        return Ok(None);
    };
    let index = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|index| *index < models.len())
        .ok_or_else(|| Error::input(format!("no model numbered {choice}")))?;
    Ok(Some(models.swap_remove(index)))
}
