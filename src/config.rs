//! Configuration file support
//!
//! Loads settings from ~/.rubylex.toml (or %USERPROFILE%\.rubylex.toml on Windows)
//!
//! Example:
//! ```toml
//! color = true
//!
//! [lexer]
//! max-depth = 256
//!
//! [theme]
//! keyword = "magenta bold"
//! "literal.string.heredoc" = "green italic"
//! ```
//!
//! Unknown categories and unparsable styles are skipped with a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{HighlightError, Result};
use crate::syntax::{Category, LexerOptions, Style, Theme, DEFAULT_MAX_DEPTH};

/// Bounds for `lexer.max-depth`
const MIN_DEPTH: usize = 8;
const MAX_DEPTH: usize = 65_536;

/// File layout, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawConfig {
    color: Option<bool>,
    lexer: RawLexer,
    theme: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawLexer {
    max_depth: Option<usize>,
}

/// Configuration settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to emit ANSI colors
    pub color: bool,
    /// State stack depth cap
    pub max_depth: usize,
    /// Category styles
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: true,
            max_depth: DEFAULT_MAX_DEPTH,
            theme: Theme::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".rubylex.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".rubylex.toml"))
        }
    }

    /// Load configuration from the default path.
    ///
    /// A missing or broken file yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HighlightError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading config");
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents)?;
        let mut config = Config::default();
        config.apply(raw);
        Ok(config)
    }

    /// Apply settings from a parsed file
    fn apply(&mut self, raw: RawConfig) {
        if let Some(color) = raw.color {
            self.color = color;
        }

        if let Some(depth) = raw.lexer.max_depth {
            self.max_depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
        }

        for (name, spec) in &raw.theme {
            let Some(category) = Category::from_name(name) else {
                warn!(category = %name, "unknown category in theme");
                continue;
            };
            match Style::parse(spec) {
                Some(style) => self.theme.set(category, style),
                None => warn!(category = %name, style = %spec, "unparsable style in theme"),
            }
        }
    }

    /// Lexer options derived from this config
    pub fn lexer_options(&self) -> LexerOptions {
        LexerOptions {
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Color;

    #[test]
    fn test_parse_config() {
        let contents = r#"
# Comment
color = false

[lexer]
max-depth = 64

[theme]
keyword = "red bold"
"literal.string.heredoc" = "green italic"
        "#;

        let config = Config::parse(contents).unwrap();
        assert!(!config.color);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.lexer_options().max_depth, 64);
        assert_eq!(
            config.theme.style_for(Category::Keyword),
            Style::fg(Color::Red).with_bold()
        );
        assert_eq!(
            config.theme.style_for(Category::StringHeredoc),
            Style::fg(Color::Green).with_italic()
        );
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert!(config.color);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(
            config.theme.style_for(Category::Comment),
            Category::Comment.default_style()
        );
    }

    #[test]
    fn test_bad_theme_entries_are_skipped() {
        let contents = r#"
[theme]
keyword = "chartreuse"
nonsense = "red"
comment = "blue"
        "#;

        let config = Config::parse(contents).unwrap();
        assert_eq!(
            config.theme.style_for(Category::Keyword),
            Category::Keyword.default_style()
        );
        assert_eq!(config.theme.style_for(Category::Comment), Style::fg(Color::Blue));
    }

    #[test]
    fn test_depth_is_clamped() {
        let config = Config::parse("[lexer]\nmax-depth = 1").unwrap();
        assert_eq!(config.max_depth, MIN_DEPTH);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("color = ").unwrap_err();
        assert!(matches!(err, HighlightError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_from(Path::new("/nonexistent/rubylex.toml")).unwrap_err();
        assert!(matches!(err, HighlightError::FileNotFound(_)));
    }
}
