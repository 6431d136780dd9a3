//! rubylex - a context-sensitive Ruby tokenizer for syntax highlighting
//!
//! ```
//! use rubylex::syntax::{RubyLexer, TokenKind};
//!
//! let lexer = RubyLexer::new()?;
//! let kinds: Vec<_> = lexer.tokenize_str("1 + 2.5").map(|t| t.kind).collect();
//! assert_eq!(kinds[0], TokenKind::Integer);
//! # Ok::<(), rubylex::error::HighlightError>(())
//! ```

pub mod config;
pub mod error;
pub mod syntax;
pub mod terminal;
