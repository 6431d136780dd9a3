//! Token kinds and highlighting categories
//!
//! The scanner produces fine-grained [`TokenKind`]s; [`TokenKind::category`]
//! folds them into the closed set of [`Category`] values a renderer styles.
//! Both mappings are exhaustive matches, so a kind added without a category
//! is a compile error rather than a scan-time failure.

use std::borrow::Cow;
use std::ops::Range;

use super::style::{Color, Style};

/// Highlighting categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Keyword,
    KeywordPseudo,
    Operator,
    /// `and`, `or`, `not`
    OperatorWord,
    Punctuation,
    /// Plain identifiers
    Name,
    NameBuiltin,
    NameConstant,
    NameFunction,
    NameClass,
    NameNamespace,
    VariableInstance,
    VariableClass,
    VariableGlobal,
    NumberInteger,
    NumberFloat,
    NumberHex,
    NumberOct,
    NumberBin,
    /// String body text without a more specific flavor
    String,
    StringSingle,
    StringDouble,
    StringChar,
    StringSymbol,
    StringRegex,
    StringHeredoc,
    StringBacktick,
    /// Percent-literals and other delimited strings
    StringOther,
    StringEscape,
    StringInterpol,
    Comment,
    CommentMultiline,
    CommentPreproc,
    Whitespace,
    /// Unclassified text from an external parse tree
    Text,
    /// Input no rule recognized
    Error,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 36] = [
        Category::Keyword,
        Category::KeywordPseudo,
        Category::Operator,
        Category::OperatorWord,
        Category::Punctuation,
        Category::Name,
        Category::NameBuiltin,
        Category::NameConstant,
        Category::NameFunction,
        Category::NameClass,
        Category::NameNamespace,
        Category::VariableInstance,
        Category::VariableClass,
        Category::VariableGlobal,
        Category::NumberInteger,
        Category::NumberFloat,
        Category::NumberHex,
        Category::NumberOct,
        Category::NumberBin,
        Category::String,
        Category::StringSingle,
        Category::StringDouble,
        Category::StringChar,
        Category::StringSymbol,
        Category::StringRegex,
        Category::StringHeredoc,
        Category::StringBacktick,
        Category::StringOther,
        Category::StringEscape,
        Category::StringInterpol,
        Category::Comment,
        Category::CommentMultiline,
        Category::CommentPreproc,
        Category::Whitespace,
        Category::Text,
        Category::Error,
    ];

    /// Get the default style for this category
    pub fn default_style(&self) -> Style {
        match self {
            Category::Keyword => Style::fg(Color::Magenta).with_bold(),
            Category::KeywordPseudo => Style::fg(Color::Magenta),
            Category::Operator | Category::OperatorWord => Style::fg(Color::BrightWhite),
            Category::Punctuation => Style::default(),
            Category::Name => Style::default(),
            Category::NameBuiltin => Style::fg(Color::Cyan),
            Category::NameConstant => Style::fg(Color::BrightRed),
            Category::NameFunction => Style::fg(Color::Blue),
            Category::NameClass => Style::fg(Color::Yellow).with_bold(),
            Category::NameNamespace => Style::fg(Color::BrightBlue),
            Category::VariableInstance
            | Category::VariableClass
            | Category::VariableGlobal => Style::fg(Color::BrightCyan),
            Category::NumberInteger
            | Category::NumberFloat
            | Category::NumberHex
            | Category::NumberOct
            | Category::NumberBin => Style::fg(Color::Cyan),
            Category::String
            | Category::StringSingle
            | Category::StringDouble
            | Category::StringBacktick
            | Category::StringOther => Style::fg(Color::Green),
            Category::StringHeredoc => Style::fg(Color::BrightGreen),
            Category::StringChar => Style::fg(Color::Green),
            Category::StringSymbol => Style::fg(Color::Yellow),
            Category::StringRegex => Style::fg(Color::BrightMagenta),
            Category::StringEscape => Style::fg(Color::BrightYellow),
            Category::StringInterpol => Style::fg(Color::BrightYellow).with_bold(),
            Category::Comment | Category::CommentMultiline => {
                Style::fg(Color::BrightBlack).with_italic()
            }
            Category::CommentPreproc => Style::fg(Color::BrightBlack),
            Category::Whitespace | Category::Text => Style::default(),
            Category::Error => Style::fg(Color::White).with_bg(Color::Red),
        }
    }

    /// Stable dotted name, used in config files and token dumps
    pub fn name(&self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::KeywordPseudo => "keyword.pseudo",
            Category::Operator => "operator",
            Category::OperatorWord => "operator.word",
            Category::Punctuation => "punctuation",
            Category::Name => "name",
            Category::NameBuiltin => "name.builtin",
            Category::NameConstant => "name.constant",
            Category::NameFunction => "name.function",
            Category::NameClass => "name.class",
            Category::NameNamespace => "name.namespace",
            Category::VariableInstance => "name.variable.instance",
            Category::VariableClass => "name.variable.class",
            Category::VariableGlobal => "name.variable.global",
            Category::NumberInteger => "literal.number.integer",
            Category::NumberFloat => "literal.number.float",
            Category::NumberHex => "literal.number.hex",
            Category::NumberOct => "literal.number.oct",
            Category::NumberBin => "literal.number.bin",
            Category::String => "literal.string",
            Category::StringSingle => "literal.string.single",
            Category::StringDouble => "literal.string.double",
            Category::StringChar => "literal.string.char",
            Category::StringSymbol => "literal.string.symbol",
            Category::StringRegex => "literal.string.regex",
            Category::StringHeredoc => "literal.string.heredoc",
            Category::StringBacktick => "literal.string.backtick",
            Category::StringOther => "literal.string.other",
            Category::StringEscape => "literal.string.escape",
            Category::StringInterpol => "literal.string.interpol",
            Category::Comment => "comment",
            Category::CommentMultiline => "comment.multiline",
            Category::CommentPreproc => "comment.preproc",
            Category::Whitespace => "text.whitespace",
            Category::Text => "text",
            Category::Error => "error",
        }
    }

    /// Parse a category from its dotted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|category| category.name() == name)
    }
}

/// What kind of string literal a string token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// String text without a more specific flavor
    Plain,
    /// `'...'`
    Single,
    /// `"..."`
    Double,
    /// `:"..."`, `:'...'`, labels
    Symbol,
    /// `` `...` ``
    Backtick,
    /// `/.../`, `%r{...}`
    Regex,
    /// Heredoc bodies
    Heredoc,
    /// Percent-literals
    Other,
}

impl Flavor {
    /// Category shared by every token of this flavor
    pub fn category(&self) -> Category {
        match self {
            Flavor::Plain => Category::String,
            Flavor::Single => Category::StringSingle,
            Flavor::Double => Category::StringDouble,
            Flavor::Symbol => Category::StringSymbol,
            Flavor::Backtick => Category::StringBacktick,
            Flavor::Regex => Category::StringRegex,
            Flavor::Heredoc => Category::StringHeredoc,
            Flavor::Other => Category::StringOther,
        }
    }
}

/// Fine-grained lexical token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Comment,
    /// `=begin ... =end`
    EmbeddedDoc,
    /// `__END__`
    EndMarker,
    /// Everything after `__END__`
    DataSection,

    Integer,
    Float,
    Hex,
    Octal,
    Binary,

    InstanceVariable,
    ClassVariable,
    GlobalVariable,

    Keyword,
    PseudoKeyword,
    WordOperator,
    Builtin,
    Identifier,
    Constant,
    MethodName,
    ClassName,
    ModuleName,

    Operator,
    Punctuation,

    /// Complete single-token literal (`'...'`, `:'...'`, `% x `)
    StringLiteral(Flavor),
    StringBegin(Flavor),
    StringContent(Flavor),
    StringEnd(Flavor),
    /// Trailing option letters of a regex literal
    RegexOptions,
    /// `?a`, `?\n`
    CharLiteral,
    Symbol,
    /// `name:` hash labels
    Label,
    Escape,
    /// `#{`
    InterpolationBegin,
    /// `}` closing an interpolation
    InterpolationEnd,
    /// `#@ivar`, `#@@cvar`, `#$gvar`
    InterpolatedVariable,

    /// `<<`, `<<-`, `<<~`
    HeredocOpener,
    /// The (possibly quoted) name after a heredoc opener
    HeredocLabel,
    /// The line closing a heredoc body
    HeredocTerminator,

    /// Unclassified text from an external parse tree
    Text,
    /// Input no rule recognized
    Unrecognized,
}

impl TokenKind {
    /// The category table
    pub fn category(&self) -> Category {
        match self {
            TokenKind::Whitespace => Category::Whitespace,
            TokenKind::Comment => Category::Comment,
            TokenKind::EmbeddedDoc => Category::CommentMultiline,
            TokenKind::EndMarker | TokenKind::DataSection => Category::CommentPreproc,
            TokenKind::Integer => Category::NumberInteger,
            TokenKind::Float => Category::NumberFloat,
            TokenKind::Hex => Category::NumberHex,
            TokenKind::Octal => Category::NumberOct,
            TokenKind::Binary => Category::NumberBin,
            TokenKind::InstanceVariable => Category::VariableInstance,
            TokenKind::ClassVariable => Category::VariableClass,
            TokenKind::GlobalVariable => Category::VariableGlobal,
            TokenKind::Keyword => Category::Keyword,
            TokenKind::PseudoKeyword => Category::KeywordPseudo,
            TokenKind::WordOperator => Category::OperatorWord,
            TokenKind::Builtin => Category::NameBuiltin,
            TokenKind::Identifier => Category::Name,
            TokenKind::Constant => Category::NameConstant,
            TokenKind::MethodName => Category::NameFunction,
            TokenKind::ClassName => Category::NameClass,
            TokenKind::ModuleName => Category::NameNamespace,
            TokenKind::Operator => Category::Operator,
            TokenKind::Punctuation => Category::Punctuation,
            TokenKind::StringLiteral(flavor)
            | TokenKind::StringBegin(flavor)
            | TokenKind::StringContent(flavor)
            | TokenKind::StringEnd(flavor) => flavor.category(),
            TokenKind::RegexOptions => Category::StringRegex,
            TokenKind::CharLiteral => Category::StringChar,
            TokenKind::Symbol | TokenKind::Label => Category::StringSymbol,
            TokenKind::Escape => Category::StringEscape,
            TokenKind::InterpolationBegin
            | TokenKind::InterpolationEnd
            | TokenKind::InterpolatedVariable => Category::StringInterpol,
            TokenKind::HeredocOpener => Category::Operator,
            TokenKind::HeredocLabel | TokenKind::HeredocTerminator => Category::NameConstant,
            TokenKind::Text => Category::Text,
            TokenKind::Unrecognized => Category::Error,
        }
    }
}

/// One emitted `(category, text)` pair, with its kind and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub category: Category,
    /// Byte offset of `text` in the input
    pub start: usize,
    pub text: &'a [u8],
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, start: usize, text: &'a [u8]) -> Self {
        Self {
            kind,
            category: kind.category(),
            start,
            text,
        }
    }

    /// Byte offset one past the end of the token
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// The token text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.text).ok()
    }

    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }
}
