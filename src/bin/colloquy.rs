//! Interactive command-line client for ChatGPT conversations.
//!
//! # Usage
//!
//! ```bash
//! # Use the token in COLLOQUY_ACCESS_TOKEN, or one saved by an earlier run
//! colloquy
//!
//! # Read the token from a file and go through a proxy
//! colloquy --token-file ~/token.txt --proxy http://127.0.0.1:8080
//!
//! # Disable colors (useful for piping output)
//! colloquy --no-color
//! ```
//!
//! Messages end with an empty line. Type `/?` in a conversation for the command list.

use std::env;
use std::error::Error as _;
use std::io;

use arrrg::CommandLine;

use colloquy::chat::{ChatArgs, ChatConfig, EditorSource, TurnController};
use colloquy::token::{TokenSources, TokenStore, obtain_token};
use colloquy::{ACCESS_TOKEN_ENV, ChatGpt, Error, PlainTextRenderer, Renderer, Result};

/// Main entry point for the colloquy application.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (args, _) = ChatArgs::from_command_line_relaxed("colloquy [OPTIONS]");
    let config = ChatConfig::from(args);
    let verbose = config.verbose;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    renderer.print_status("Colloquy - A command-line interface to ChatGPT");
    renderer.print_status(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
    renderer.newline();

    if let Err(err) = run(config, &mut renderer).await {
        renderer.print_error(&format!("Error occurred: {err}"));
        if verbose {
            let mut source = err.source();
            while let Some(cause) = source {
                renderer.print_error(&format!("  caused by: {cause}"));
                source = cause.source();
            }
        }
        std::process::exit(1);
    }
}

fn handler_error(err: ctrlc::Error) -> Error {
    Error::io("Failed to install Ctrl-C handler", io::Error::other(err))
}

async fn run(config: ChatConfig, renderer: &mut PlainTextRenderer) -> Result<()> {
    // Ctrl+C at a prompt is handled by the editor; this covers a reply in flight.
    ctrlc::set_handler(|| {
        println!("\nBye...");
        std::process::exit(0);
    })
    .map_err(handler_error)?;

    let mut input = EditorSource::new()?;
    let store = TokenStore::default_location()?;
    let sources = TokenSources {
        token_file: config.token_file.clone(),
        env_token: env::var(ACCESS_TOKEN_ENV).ok(),
        verbose: config.verbose,
    };
    let Some(token) = obtain_token(&sources, &store, &mut input, renderer)? else {
        renderer.print_info("Bye...");
        return Ok(());
    };

    let client = ChatGpt::with_options(Some(token), config.base_url.clone(), config.proxy.clone())?;
    TurnController::new(&client, &mut input, renderer, config)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_failure_is_io() {
        let err = handler_error(ctrlc::Error::MultipleHandlers);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.to_string(), "I/O error: Failed to install Ctrl-C handler");
        assert!(err.source().is_some());
    }
}
