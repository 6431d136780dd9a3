//! Property-based tests for the Ruby lexer.
//!
//! For arbitrary bytes and for random Ruby-looking text, checks that the
//! token stream:
//! 1. concatenates back to the input,
//! 2. is ordered, contiguous and free of empty tokens,
//! 3. is the same on every run.

use std::sync::OnceLock;

use proptest::prelude::*;
use rubylex::syntax::tree::tokenize_lexemes;
use rubylex::syntax::{RubyLexer, Token, TokenKind};

fn lexer() -> &'static RubyLexer {
    static LEXER: OnceLock<RubyLexer> = OnceLock::new();
    LEXER.get_or_init(|| RubyLexer::new().expect("rule tables compile"))
}

fn joined(tokens: &[Token<'_>]) -> Vec<u8> {
    tokens.iter().flat_map(|t| t.text.iter().copied()).collect()
}

fn check_stream(input: &[u8], tokens: &[Token<'_>]) -> Result<(), TestCaseError> {
    prop_assert_eq!(joined(tokens), input.to_vec());
    let mut offset = 0;
    for token in tokens {
        prop_assert!(!token.text.is_empty(), "empty token at {}", token.start);
        prop_assert_eq!(token.start, offset);
        prop_assert_eq!(token.category, token.kind.category());
        offset = token.end();
    }
    Ok(())
}

// -- Strategies --

const FRAGMENTS: &[&str] = &[
    "x", "foo", "Bar", "@a", "@@b", "$c", "$!", "1", "0x1f", "0b10", "017", "2.5e3", " ", "  ",
    "\n", "\t", "+", "-", "*", "/", "%", "<<", "<<~EOS", "<<-A", "EOS", "A", "?", ":", "::",
    "?a", "=", "==", "=~", "(", ")", "[", "]", "{", "}", "|", ",", ".", "..", "#", "# c\n",
    "\"", "'", "`", "\\", "#{", "#@x", ":sym", ":\"", "%w(", "%r{", "%q|", "% ", "def ",
    "class ", "module ", "end", "if", "do", "puts", "nil", "and", "=begin", "=end",
    "__END__", "key: ", "é", "\r\n",
];

fn ruby_like() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..48).prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn arbitrary_bytes_round_trip(input in prop::collection::vec(any::<u8>(), 0..256)) {
        let tokens: Vec<_> = lexer().tokenize(&input).collect();
        check_stream(&input, &tokens)?;
    }

    #[test]
    fn ruby_like_text_round_trips(input in ruby_like()) {
        let tokens: Vec<_> = lexer().tokenize_str(&input).collect();
        check_stream(input.as_bytes(), &tokens)?;
    }

    #[test]
    fn tokenizing_is_deterministic(input in ruby_like()) {
        let first: Vec<_> = lexer().tokenize_str(&input).collect();
        let second: Vec<_> = lexer().tokenize_str(&input).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn lexeme_stream_round_trips(
        input in "[a-z \n]{0,64}",
        spans in prop::collection::vec((0usize..80, 0usize..16), 0..16),
    ) {
        let lexemes = spans
            .into_iter()
            .map(|(start, len)| (TokenKind::Identifier, start..start + len));
        let tokens = tokenize_lexemes(input.as_bytes(), lexemes);
        check_stream(input.as_bytes(), &tokens)?;
    }
}
