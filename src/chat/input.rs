//! Reading user input.
//!
//! Lines come from a [`LineSource`]. Messages may span several lines: a message is
//! complete at the first blank line, while a line starting with `/` is a command on
//! its own and discards anything typed before it.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::Result;
use crate::render::Renderer;

/// A source of input lines.
pub trait LineSource {
    /// Read one line without its terminator.
    ///
    /// Returns `Ok(None)` when the user closed the input or pressed Ctrl-C, both of
    /// which mean "leave".
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line source backed by a rustyline editor.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    /// Creates an editor on the controlling terminal.
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if line.starts_with('/') {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Accumulates lines into one logical input unit.
#[derive(Debug, Default)]
pub struct InputFramer {
    lines: Vec<String>,
}

impl InputFramer {
    /// Feeds one line; returns the unit once it is complete.
    pub fn push(&mut self, line: String) -> Option<String> {
        if line.is_empty() {
            return Some(std::mem::take(&mut self.lines).join("\n"));
        }
        if line.starts_with('/') {
            self.lines.clear();
            return Some(line);
        }
        self.lines.push(line);
        None
    }
}

/// Reads one logical input unit: a multi-line message or a single command line.
///
/// Returns `Ok(None)` when the input was closed.
pub fn read_unit(source: &mut dyn LineSource) -> Result<Option<String>> {
    let mut framer = InputFramer::default();
    loop {
        let Some(line) = source.read_line("")? else {
            return Ok(None);
        };
        if let Some(unit) = framer.push(line) {
            return Ok(Some(unit));
        }
    }
}

/// Asks a free-form question.
pub fn ask(source: &mut dyn LineSource, prompt: &str) -> Result<Option<String>> {
    source.read_line(&format!("{prompt}: "))
}

/// Asks until the answer is one of `choices`.
///
/// An empty answer selects `default` when one is given.
pub fn ask_choice(
    source: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
    prompt: &str,
    choices: &[String],
    default: Option<&str>,
) -> Result<Option<String>> {
    let prompt = match default {
        Some(default) => format!("{prompt} ({default}): "),
        None => format!("{prompt}: "),
    };
    loop {
        let Some(answer) = source.read_line(&prompt)? else {
            return Ok(None);
        };
        let answer = answer.trim();
        if answer.is_empty()
            && let Some(default) = default
        {
            return Ok(Some(default.to_string()));
        }
        if choices.iter().any(|choice| choice == answer) {
            return Ok(Some(answer.to_string()));
        }
        renderer.print_error("Please select one of the available options");
    }
}

/// Asks a yes/no question.
pub fn confirm(
    source: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
    prompt: &str,
    default: bool,
) -> Result<Option<bool>> {
    let hint = if default { "y" } else { "n" };
    let prompt = format!("{prompt} [y/n] ({hint}): ");
    loop {
        let Some(answer) = source.read_line(&prompt)? else {
            return Ok(None);
        };
        match answer.trim().to_lowercase().as_str() {
            "" => return Ok(Some(default)),
            "y" | "yes" => return Ok(Some(true)),
            "n" | "no" => return Ok(Some(false)),
            _ => renderer.print_error("Please enter Y or N"),
        }
    }
}
