//! Terminal output using crossterm
//!
//! Writes highlighted tokens as ANSI-styled text to any writer. Token text
//! is written byte for byte, so uncolored output equals the input.

use std::io::Write;

use crossterm::{
    queue,
    style::{Attribute, Color as TermColor, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
};

use crate::error::Result;
use crate::syntax::{Color, Style, Theme, Token};

/// Map a palette color to crossterm; `None` for the terminal default
fn term_color(color: Color) -> Option<TermColor> {
    let color = match color {
        Color::Default => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
    };
    Some(color)
}

/// Styled token writer
pub struct Terminal<W: Write> {
    out: W,
    theme: Theme,
    /// Emit escape sequences; plain text otherwise
    color: bool,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, theme: Theme, color: bool) -> Self {
        Self { out, theme, color }
    }

    /// Apply a style to subsequent output
    pub fn set_style(&mut self, style: Style) -> Result<()> {
        if let Some(fg) = term_color(style.fg) {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = term_color(style.bg) {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.italic {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        if style.underline {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }

    /// Reset all attributes
    pub fn reset_attributes(&mut self) -> Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, text: &[u8]) -> Result<()> {
        self.out.write_all(text)?;
        Ok(())
    }

    /// Write tokens with their category styles
    pub fn render<'a, I>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = Token<'a>>,
    {
        for token in tokens {
            let style = self.theme.style_for(token.category);
            if !self.color || style.is_default() {
                self.write_bytes(token.text)?;
                continue;
            }
            // Reset before each newline so backgrounds do not bleed
            for line in token.text.split_inclusive(|b| *b == b'\n') {
                let (body, newline) = match line.strip_suffix(b"\n") {
                    Some(body) => (body, &b"\n"[..]),
                    None => (line, &b""[..]),
                };
                if !body.is_empty() {
                    self.set_style(style)?;
                    self.write_bytes(body)?;
                    self.reset_attributes()?;
                }
                self.write_bytes(newline)?;
            }
        }
        self.flush()
    }

    /// Write one line per token: offset, category name and quoted text
    pub fn dump<'a, I>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = Token<'a>>,
    {
        for token in tokens {
            writeln!(
                self.out,
                "{}\t{}\t{:?}",
                token.start,
                token.category.name(),
                token.text_lossy()
            )?;
        }
        self.flush()
    }

    /// Flush output buffer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::RubyLexer;

    fn render(src: &str, color: bool) -> String {
        let lexer = RubyLexer::new().unwrap();
        let mut term = Terminal::new(Vec::new(), Theme::new(), color);
        term.render(lexer.tokenize_str(src)).unwrap();
        String::from_utf8(term.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_render_is_identity() {
        let src = "def foo(x)\n  x * 2 # double\nend\n";
        assert_eq!(render(src, false), src);
    }

    #[test]
    fn test_color_render() {
        let out = render("if x\nend", true);
        assert!(out.contains("\x1b["));
        assert!(out.contains("if"));
        assert!(out.contains("end"));
        assert!(out.contains("\x1b[0m"));
    }

    #[test]
    fn test_multiline_token_resets_before_newline() {
        let out = render("=begin\nx\n=end\n", true);
        assert!(out.contains("=begin\x1b[0m"));
    }

    #[test]
    fn test_dump() {
        let lexer = RubyLexer::new().unwrap();
        let mut term = Terminal::new(Vec::new(), Theme::new(), false);
        term.dump(lexer.tokenize_str("x = 1")).unwrap();
        let out = String::from_utf8(term.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "0\tname\t\"x\"");
        assert_eq!(lines.last(), Some(&"4\tliteral.number.integer\t\"1\""));
    }

    #[test]
    fn test_term_color() {
        assert_eq!(term_color(Color::Default), None);
        assert_eq!(term_color(Color::BrightBlack), Some(TermColor::DarkGrey));
    }
}
