//! Output rendering for the chat loop.
//!
//! Everything the chat loop shows the user goes through [`Renderer`], so the loop can
//! be driven against a terminal or a recorder in tests.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for hints).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for blue text (used for the user).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for green text (used for the assistant).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for menu options and warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for magenta text (used for status messages).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// ANSI sequence that clears the screen and homes the cursor.
const ANSI_CLEAR: &str = "\x1b[2J\x1b[H";

/// Banner printed before the user's turn.
pub const USER_BANNER: &str = "You:";

/// Banner printed before the assistant's turn.
pub const ASSISTANT_BANNER: &str = "ChatGPT:";

/// Hint printed under the conversation title.
pub const TITLE_HINT: &str = "Double enter to send. Type /? for help.";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print the banner that opens the user's turn.
    fn print_user_banner(&mut self);

    /// Print the banner that opens the assistant's turn.
    fn print_assistant_banner(&mut self);

    /// Print a complete user message from history.
    fn print_user_text(&mut self, text: &str);

    /// Print a complete assistant message from history.
    fn print_assistant_text(&mut self, text: &str);

    /// Print a chunk of a streamed reply.
    ///
    /// No newline is added; chunks are flushed as they arrive.
    fn print_text(&mut self, text: &str);

    /// Print the conversation title banner.
    fn print_title(&mut self, title: &str);

    /// Print a bold heading such as a menu caption.
    fn print_heading(&mut self, heading: &str);

    /// Print an informational line.
    fn print_info(&mut self, info: &str);

    /// Print a highlighted line, used for menu controls.
    fn print_notice(&mut self, notice: &str);

    /// Print a status message such as a successful rename.
    fn print_status(&mut self, status: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print a value the user should keep private.
    fn print_sensitive(&mut self, label: &str, value: &str);

    /// End the current line.
    fn newline(&mut self);

    /// Clear the screen.
    fn clear_screen(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, style: &str, text: &str) {
        let styled = self.styled(style, text);
        println!("{styled}");
        self.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_user_banner(&mut self) {
        self.line(&format!("{ANSI_BOLD}{ANSI_BLUE}"), USER_BANNER);
    }

    fn print_assistant_banner(&mut self) {
        self.line(&format!("{ANSI_BOLD}{ANSI_GREEN}"), ASSISTANT_BANNER);
    }

    fn print_user_text(&mut self, text: &str) {
        self.line(ANSI_BLUE, text);
    }

    fn print_assistant_text(&mut self, text: &str) {
        self.line(ANSI_GREEN, text);
    }

    fn print_text(&mut self, text: &str) {
        let styled = self.styled(ANSI_GREEN, text);
        print!("{styled}");
        self.flush();
    }

    fn print_title(&mut self, title: &str) {
        self.line(
            &format!("{ANSI_BOLD}{ANSI_BLUE}"),
            &format!("==================== {title} ===================="),
        );
        self.line(ANSI_DIM, TITLE_HINT);
    }

    fn print_heading(&mut self, heading: &str) {
        self.line(ANSI_BOLD, heading);
    }

    fn print_info(&mut self, info: &str) {
        self.line(ANSI_BLUE, info);
    }

    fn print_notice(&mut self, notice: &str) {
        self.line(ANSI_YELLOW, notice);
    }

    fn print_status(&mut self, status: &str) {
        self.line(ANSI_MAGENTA, status);
    }

    fn print_error(&mut self, error: &str) {
        let styled = self.styled(ANSI_RED, error);
        eprintln!("{styled}");
    }

    fn print_sensitive(&mut self, label: &str, value: &str) {
        println!();
        self.line(&format!("{ANSI_BOLD}{ANSI_YELLOW}"), label);
        self.line(ANSI_YELLOW, value);
        println!();
        self.flush();
    }

    fn newline(&mut self) {
        println!();
        self.flush();
    }

    fn clear_screen(&mut self) {
        if self.use_color {
            print!("{ANSI_CLEAR}");
        } else {
            // Without escape codes the best we can do is scroll the old output away.
            print!("{}", "\n".repeat(100));
        }
        self.flush();
    }
}
