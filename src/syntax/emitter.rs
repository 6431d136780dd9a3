//! Token emitter
//!
//! Collects tokens in input order and fills every gap between the end of
//! the previous token and the start of the next one, so the emitted text
//! always concatenates back to the input.

use std::collections::VecDeque;

use super::tokens::{Token, TokenKind};

/// Ordered token sink with gap filling
#[derive(Debug)]
pub struct Emitter<'a> {
    source: &'a [u8],
    /// End of the last emitted token
    last_end: usize,
    out: VecDeque<Token<'a>>,
}

impl<'a> Emitter<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            last_end: 0,
            out: VecDeque::new(),
        }
    }

    /// Emit `start..end` as `kind`.
    ///
    /// Empty spans are dropped. A span starting before the previous token's
    /// end is clipped so tokens never overlap.
    pub fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.emit_with_filler(kind, start, end, TokenKind::Text);
    }

    /// Like [`Emitter::emit`], classifying non-whitespace gap bytes as `filler`
    pub fn emit_with_filler(&mut self, kind: TokenKind, start: usize, end: usize, filler: TokenKind) {
        let end = end.min(self.source.len());
        let start = start.max(self.last_end);
        if end <= start {
            return;
        }
        self.fill(start, filler);
        let source = self.source;
        self.out.push_back(Token::new(kind, start, &source[start..end]));
        self.last_end = end;
    }

    /// Fill the gap up to `end`.
    ///
    /// Whitespace runs become `Whitespace` tokens, anything else `filler`.
    pub fn fill(&mut self, end: usize, filler: TokenKind) {
        let source = self.source;
        let end = end.min(source.len());
        let mut pos = self.last_end;
        while pos < end {
            let blank = source[pos].is_ascii_whitespace();
            let run = source[pos..end]
                .iter()
                .position(|b| b.is_ascii_whitespace() != blank)
                .map_or(end, |n| pos + n);
            let kind = if blank { TokenKind::Whitespace } else { filler };
            self.out.push_back(Token::new(kind, pos, &source[pos..run]));
            pos = run;
        }
        self.last_end = self.last_end.max(end);
    }

    /// Fill the trailing gap to the end of the source
    pub fn finish(&mut self) {
        self.fill(self.source.len(), TokenKind::Text);
    }

    pub fn pop_front(&mut self) -> Option<Token<'a>> {
        self.out.pop_front()
    }

    /// Take every token emitted so far
    pub fn drain(&mut self) -> Vec<Token<'a>> {
        self.out.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokens::Category;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a [u8]> {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_gap_becomes_whitespace() {
        let src = b"1 + 2";
        let mut emitter = Emitter::new(src);
        emitter.emit(TokenKind::Integer, 0, 1);
        emitter.emit(TokenKind::Operator, 2, 3);
        emitter.emit(TokenKind::Integer, 4, 5);
        emitter.finish();

        let tokens = emitter.drain();
        assert_eq!(texts(&tokens), vec![&b"1"[..], b" ", b"+", b" ", b"2"]);
        assert_eq!(tokens[1].category, Category::Whitespace);
    }

    #[test]
    fn test_empty_and_overlapping_spans() {
        let src = b"abcdef";
        let mut emitter = Emitter::new(src);
        emitter.emit(TokenKind::Identifier, 0, 3);
        emitter.emit(TokenKind::RegexOptions, 3, 3);
        emitter.emit(TokenKind::Identifier, 2, 5);
        emitter.finish();

        let tokens = emitter.drain();
        assert_eq!(texts(&tokens), vec![&b"abc"[..], b"de", b"f"]);
        assert_eq!(tokens[2].kind, TokenKind::Text);
    }

    #[test]
    fn test_filler_splits_whitespace_runs() {
        let src = b"( x )";
        let mut emitter = Emitter::new(src);
        emitter.emit_with_filler(TokenKind::Identifier, 2, 3, TokenKind::Punctuation);
        emitter.fill(src.len(), TokenKind::Punctuation);

        let tokens = emitter.drain();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Punctuation,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Punctuation,
            ]
        );
    }

    #[test]
    fn test_finish_on_empty_source() {
        let mut emitter = Emitter::new(b"");
        emitter.finish();
        assert!(emitter.drain().is_empty());
    }
}
