//! Slash command parsing for the chat application.
//!
//! Lines starting with `/` control the session instead of being sent as messages.
//! Matching is exact after trimming and lowercasing; several aliases map to each
//! command, and anything unrecognized asks for the help listing.

/// A parsed chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Leave the program.
    Quit,

    /// Delete the current conversation and return to the selector.
    Delete,

    /// Rename the current conversation.
    Title,

    /// Return to the conversation selector.
    Select,

    /// Reload the current conversation from the server.
    Reload,

    /// Start a new conversation without going through the selector.
    New,

    /// Ask for another reply to the last prompt.
    Regenerate,

    /// Show the access token.
    Token,

    /// Clear the screen.
    Clear,

    /// Show the client version.
    Version,

    /// Display help information.
    Help,
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it should be
/// treated as a regular message. Unknown commands parse as [`ChatCommand::Help`].
///
/// # Examples
///
/// ```
/// # use colloquy::chat::{parse_command, ChatCommand};
/// assert_eq!(parse_command("/bye"), Some(ChatCommand::Quit));
/// assert_eq!(parse_command("/nonsense"), Some(ChatCommand::Help));
/// assert!(parse_command("Hello there").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let command = match input.to_lowercase().as_str() {
        "/quit" | "/exit" | "/bye" => ChatCommand::Quit,
        "/del" | "/delete" | "/remove" => ChatCommand::Delete,
        "/title" | "/set_title" | "/set-title" => ChatCommand::Title,
        "/select" => ChatCommand::Select,
        "/refresh" | "/reload" => ChatCommand::Reload,
        "/new" => ChatCommand::New,
        "/regen" | "/regenerate" => ChatCommand::Regenerate,
        "/token" => ChatCommand::Token,
        "/cls" | "/clear" => ChatCommand::Clear,
        "/ver" | "/version" => ChatCommand::Version,
        _ => ChatCommand::Help,
    };

    Some(command)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /title                 Set the title of the current conversation
  /del                   Delete the current conversation
  /refresh               Reload the current conversation
  /select                Choose another conversation
  /new                   Start a new conversation
  /regen                 Regenerate the last reply
  /cls                   Clear the screen
  /token                 Show your access token
  /ver                   Show the version
  /?                     Show this help message
  /quit                  Exit the chat"#
}
