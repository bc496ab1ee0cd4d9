//! Finding the access token and remembering it between runs.
//!
//! The token comes from, in order: a file named on the command line, the
//! `COLLOQUY_ACCESS_TOKEN` environment variable, a token saved by an earlier run,
//! or the user pasting one in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::chat::{LineSource, ask, ask_choice, confirm};
use crate::error::{Error, Result};
use crate::render::Renderer;

/// Directory under the user's config dir holding saved state.
pub const CONFIG_DIR_NAME: &str = "colloquy";

/// Name of the saved token file.
pub const TOKEN_FILE_NAME: &str = "access_token.dat";

/// A token on disk in the user's configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/colloquy/access_token.dat`.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            Error::not_found(
                "Could not determine the user configuration directory",
                Some("directory".to_string()),
                None,
            )
        })?;
        Ok(Self::new(
            config_dir.join(CONFIG_DIR_NAME).join(TOKEN_FILE_NAME),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved token, if there is a non-empty one.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the token, creating the directory if needed.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        Ok(())
    }

    /// Removes the saved token. Removing a token that is not there succeeds.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reads a token file given on the command line.
pub fn read_token_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::not_found(
            format!("{} is not a file", path.display()),
            Some("file".to_string()),
            Some(path.display().to_string()),
        ));
    }
    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// A token and whether it differs from the saved one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub needs_save: bool,
}

/// Where to look for a token.
#[derive(Debug, Clone, Default)]
pub struct TokenSources {
    pub token_file: Option<PathBuf>,
    pub env_token: Option<String>,
    pub verbose: bool,
}

/// Resolves the access token without saving it.
///
/// Returns `Ok(None)` when the input was closed.
pub fn resolve_token(
    sources: &TokenSources,
    store: &TokenStore,
    input: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
) -> Result<Option<ResolvedToken>> {
    let saved = store.load()?;
    if saved.is_some() && sources.verbose {
        renderer.print_status(&format!("Found access token file: {}", store.path().display()));
    }

    let given = match (&sources.token_file, &sources.env_token) {
        (Some(path), _) => Some(read_token_file(path)?),
        (None, Some(token)) if !token.trim().is_empty() => Some(token.trim().to_string()),
        _ => None,
    };
    if let Some(token) = given {
        let needs_save = saved.as_deref() != Some(token.as_str());
        return Ok(Some(ResolvedToken { token, needs_save }));
    }

    if let Some(saved) = saved {
        let choices = ["y", "n", "del"].map(String::from);
        let Some(answer) = ask_choice(
            input,
            renderer,
            "A saved access token has been detected. Do you want to use it?",
            &choices,
            Some("n"),
        )?
        else {
            return Ok(None);
        };
        match answer.as_str() {
            "y" => {
                return Ok(Some(ResolvedToken {
                    token: saved,
                    needs_save: false,
                }));
            }
            "del" => store.delete()?,
            _ => {}
        }
    }

    renderer.print_heading("Please paste your access token to log in ChatGPT!");
    loop {
        let Some(token) = ask(input, "  Access token")? else {
            return Ok(None);
        };
        let token = token.trim();
        if !token.is_empty() {
            return Ok(Some(ResolvedToken {
                token: token.to_string(),
                needs_save: true,
            }));
        }
        renderer.print_error("The access token cannot be empty.");
    }
}

/// Resolves the access token and offers to save a new one.
///
/// Returns `Ok(None)` when the input was closed.
pub fn obtain_token(
    sources: &TokenSources,
    store: &TokenStore,
    input: &mut dyn LineSource,
    renderer: &mut dyn Renderer,
) -> Result<Option<String>> {
    let Some(resolved) = resolve_token(sources, store, input, renderer)? else {
        return Ok(None);
    };
    if resolved.needs_save {
        match confirm(
            input,
            renderer,
            "Do you want to save your access token for the next login?",
            false,
        )? {
            None => return Ok(None),
            Some(true) => {
                store.save(&resolved.token)?;
                if sources.verbose {
                    renderer.print_status(&format!(
                        "The access token has been saved to the file: {}",
                        store.path().display()
                    ));
                }
            }
            Some(false) => {}
        }
    }
    Ok(Some(resolved.token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::{RecordingRenderer, ScriptedInput};
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("colloquy-test-{}", Uuid::new_v4()))
    }

    fn scratch_store() -> TokenStore {
        TokenStore::new(scratch_dir().join(CONFIG_DIR_NAME).join(TOKEN_FILE_NAME))
    }

    #[test]
    fn store_round_trip() {
        let store = scratch_store();
        assert_eq!(store.load().unwrap(), None);
        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));
        store.delete().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.delete().unwrap();
    }

    #[test]
    fn default_location_ends_with_token_file() {
        if let Ok(store) = TokenStore::default_location() {
            assert!(store.path().ends_with("colloquy/access_token.dat"));
        }
    }

    #[test]
    fn missing_token_file_is_not_found() {
        let err = read_token_file(&scratch_dir().join("nope.txt")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn token_file_is_trimmed_and_compared_to_saved() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("token.txt");
        fs::write(&file, "  tok-1\n").unwrap();

        let store = scratch_store();
        let sources = TokenSources {
            token_file: Some(file),
            ..TokenSources::default()
        };
        let mut input = ScriptedInput::new(Vec::<&str>::new());
        let mut renderer = RecordingRenderer::default();

        let resolved = resolve_token(&sources, &store, &mut input, &mut renderer)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.token, "tok-1");
        assert!(resolved.needs_save);

        store.save("tok-1").unwrap();
        let resolved = resolve_token(&sources, &store, &mut input, &mut renderer)
            .unwrap()
            .unwrap();
        assert!(!resolved.needs_save);
        assert!(input.prompts.is_empty());
    }

    #[test]
    fn environment_token_used_without_prompting() {
        let store = scratch_store();
        let sources = TokenSources {
            env_token: Some("env-token".to_string()),
            ..TokenSources::default()
        };
        let mut input = ScriptedInput::new(["n"]);
        let mut renderer = RecordingRenderer::default();

        let token = obtain_token(&sources, &store, &mut input, &mut renderer)
            .unwrap()
            .unwrap();
        assert_eq!(token, "env-token");
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(input.prompts.len(), 1);
    }

    #[test]
    fn saved_token_accepted() {
        let store = scratch_store();
        store.save("saved").unwrap();
        let mut input = ScriptedInput::new(["y"]);
        let mut renderer = RecordingRenderer::default();

        let token = obtain_token(&TokenSources::default(), &store, &mut input, &mut renderer)
            .unwrap()
            .unwrap();
        assert_eq!(token, "saved");
        // No offer to save a token that is already saved.
        assert_eq!(input.prompts.len(), 1);
    }

    #[test]
    fn saved_token_deleted_then_pasted_and_saved() {
        let store = scratch_store();
        store.save("old").unwrap();
        let mut input = ScriptedInput::new(["del", "", "new-token", "y"]);
        let mut renderer = RecordingRenderer::default();

        let token = obtain_token(&TokenSources::default(), &store, &mut input, &mut renderer)
            .unwrap()
            .unwrap();
        assert_eq!(token, "new-token");
        assert_eq!(store.load().unwrap(), Some("new-token".to_string()));
        assert_eq!(
            renderer.errors(),
            vec!["The access token cannot be empty.".to_string()]
        );
    }

    #[test]
    fn declining_saved_token_defaults_to_paste() {
        let store = scratch_store();
        store.save("saved").unwrap();
        let mut input = ScriptedInput::new(["", "pasted", ""]);
        let mut renderer = RecordingRenderer::default();

        let token = obtain_token(&TokenSources::default(), &store, &mut input, &mut renderer)
            .unwrap()
            .unwrap();
        assert_eq!(token, "pasted");
        assert_eq!(store.load().unwrap(), Some("saved".to_string()));
    }

    #[test]
    fn closed_input_gives_up() {
        let store = scratch_store();
        let mut input = ScriptedInput::new(Vec::<&str>::new());
        let mut renderer = RecordingRenderer::default();

        let token =
            obtain_token(&TokenSources::default(), &store, &mut input, &mut renderer).unwrap();
        assert_eq!(token, None);
    }
}
