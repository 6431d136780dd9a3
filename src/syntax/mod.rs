//! Ruby syntax highlighting
//!
//! The lexer turns source bytes into an ordered stream of [`Token`]s whose
//! texts concatenate back to the input. Styling lives in [`style`]; the
//! lexer never looks at it.

pub mod detect;
mod emitter;
mod heredoc;
mod lexer;
mod ruby;
mod rules;
mod state;
pub mod style;
mod tokens;
pub mod tree;

pub use lexer::{LexerOptions, RubyLexer, Tokens, DEFAULT_MAX_DEPTH};
pub use style::{Color, Style, Theme};
pub use tokens::{Category, Flavor, Token, TokenKind};
