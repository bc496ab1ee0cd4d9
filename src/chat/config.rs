//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration the chat loop runs with.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

/// Default number of conversations per selector page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Model assumed for conversations whose messages never name one.
pub const DEFAULT_MODEL_SLUG: &str = "text-davinci-002-render-sha";

/// Command-line arguments for the colloquy tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// File holding the access token.
    #[arrrg(optional, "Read the access token from FILE", "FILE")]
    pub token_file: Option<String>,

    /// HTTP proxy for all requests.
    #[arrrg(optional, "Use a proxy, e.g. http://127.0.0.1:8080", "URL")]
    pub proxy: Option<String>,

    /// Root of the backend API.
    #[arrrg(optional, "Backend API root (default: https://chat.openai.com/backend-api/)", "URL")]
    pub base_url: Option<String>,

    /// Conversations shown per page.
    #[arrrg(optional, "Conversations per page (default: 20)", "N")]
    pub page_size: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Show more detail on errors.
    #[arrrg(flag, "Print error causes and token diagnostics")]
    pub verbose: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Conversations per selector page.
    pub page_size: u64,

    /// Model used when a loaded conversation does not name one.
    pub default_model: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to print error causes.
    pub verbose: bool,

    /// Backend API root; `None` uses the client default.
    pub base_url: Option<String>,

    /// HTTP proxy URL.
    pub proxy: Option<String>,

    /// File to read the access token from.
    pub token_file: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Page size: 20
    /// - Default model: text-davinci-002-render-sha
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_model: DEFAULT_MODEL_SLUG.to_string(),
            use_color: true,
            verbose: false,
            base_url: None,
            proxy: None,
            token_file: None,
        }
    }

    /// Sets the selector page size. Zero is raised to one.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the fallback model slug.
    pub fn with_default_model(mut self, slug: impl Into<String>) -> Self {
        self.default_model = slug.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_token_file(mut self, path: Option<PathBuf>) -> Self {
        self.token_file = path;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            use_color: !args.no_color,
            verbose: args.verbose,
            base_url: args.base_url,
            proxy: args.proxy,
            token_file: args.token_file.map(PathBuf::from),
            ..ChatConfig::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.default_model, "text-davinci-002-render-sha");
        assert!(config.use_color);
        assert!(!config.verbose);
        assert!(config.base_url.is_none());
        assert!(config.proxy.is_none());
        assert!(config.token_file.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            token_file: Some("/tmp/token.txt".to_string()),
            proxy: Some("http://127.0.0.1:8080".to_string()),
            base_url: Some("http://localhost:9000/api/".to_string()),
            page_size: Some(0),
            no_color: true,
            verbose: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.page_size, 1);
        assert!(!config.use_color);
        assert!(config.verbose);
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000/api/"));
        assert_eq!(config.token_file, Some(PathBuf::from("/tmp/token.txt")));
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_page_size(5)
            .with_default_model("gpt-4")
            .without_color()
            .with_verbose(true)
            .with_base_url(Some("http://localhost/".to_string()))
            .with_proxy(Some("socks5://localhost:1080".to_string()))
            .with_token_file(Some(PathBuf::from("token")));

        assert_eq!(config.page_size, 5);
        assert_eq!(config.default_model, "gpt-4");
        assert!(!config.use_color);
        assert!(config.verbose);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost/"));
        assert_eq!(config.proxy.as_deref(), Some("socks5://localhost:1080"));
        assert_eq!(config.token_file, Some(PathBuf::from("token")));
    }
}
