//! Style types for token rendering
//!
//! Maps highlighting categories to terminal styles. The lexer itself never
//! looks at styles; this is consumed by the renderer and the config layer.

use std::collections::HashMap;

use super::tokens::Category;

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// Parse a color name as written in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "brightblack" | "gray" | "grey" => Color::BrightBlack,
            "brightred" => Color::BrightRed,
            "brightgreen" => Color::BrightGreen,
            "brightyellow" => Color::BrightYellow,
            "brightblue" => Color::BrightBlue,
            "brightmagenta" => Color::BrightMagenta,
            "brightcyan" => Color::BrightCyan,
            "brightwhite" => Color::BrightWhite,
            _ => return None,
        };
        Some(color)
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Parse a style description such as `"magenta bold"` or `"white on red"`.
    ///
    /// Words are attributes (`bold`, `italic`, `underline`) or colors; the
    /// first color is the foreground, a color after `on` is the background.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut style = Style::default();
        let mut background = false;
        for word in spec.split_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "bold" => style = style.with_bold(),
                "italic" => style = style.with_italic(),
                "underline" => style = style.with_underline(),
                "on" => background = true,
                other => {
                    let color = Color::from_name(other)?;
                    if background {
                        style.bg = color;
                    } else {
                        style.fg = color;
                    }
                }
            }
        }
        Some(style)
    }
}

/// Category to style mapping with per-category overrides
#[derive(Debug, Clone, Default)]
pub struct Theme {
    overrides: HashMap<Category, Style>,
}

impl Theme {
    /// Theme using only the built-in default styles
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the style of one category
    pub fn set(&mut self, category: Category, style: Style) {
        self.overrides.insert(category, style);
    }

    /// Style for a category, falling back to its default
    pub fn style_for(&self, category: Category) -> Style {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_default() {
        let style = Style::default();
        assert!(style.is_default());
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.bg, Color::Default);
        assert!(!style.bold);
    }

    #[test]
    fn test_style_builders() {
        let style = Style::fg(Color::Red).with_bold().with_bg(Color::Blue);
        assert_eq!(style.fg, Color::Red);
        assert_eq!(style.bg, Color::Blue);
        assert!(style.bold);
        assert!(!style.is_default());
    }

    #[test]
    fn test_style_parse() {
        let style = Style::parse("magenta bold").unwrap();
        assert_eq!(style, Style::fg(Color::Magenta).with_bold());

        let style = Style::parse("white on bright-red underline").unwrap();
        assert_eq!(style.fg, Color::White);
        assert_eq!(style.bg, Color::BrightRed);
        assert!(style.underline);

        assert_eq!(Style::parse("chartreuse"), None);
        assert_eq!(Style::parse(""), Some(Style::default()));
    }

    #[test]
    fn test_theme_override() {
        let mut theme = Theme::new();
        assert_eq!(
            theme.style_for(Category::Keyword),
            Category::Keyword.default_style()
        );

        theme.set(Category::Keyword, Style::fg(Color::Red));
        assert_eq!(theme.style_for(Category::Keyword), Style::fg(Color::Red));
        assert_eq!(
            theme.style_for(Category::Comment),
            Category::Comment.default_style()
        );
    }
}
