//! Error types for rubylex
//!
//! Malformed Ruby source never produces an error: it degrades to
//! unrecognized tokens. Errors only come from I/O, configuration and
//! rule table construction.

use thiserror::Error;

/// Result type alias for rubylex operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighter error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pattern for rule `{name}`: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Message(String),
}
