//! Pattern rules for the lexer state machine
//!
//! A rule is an anchored pattern, an optional guard standing in for the
//! lookaround the regex engine does not support, and a tagged [`Action`]
//! the interpreter in `lexer.rs` applies when the rule wins.

use std::ops::Range;

use regex::bytes::Regex;

use super::state::StateId;
use super::tokens::TokenKind;
use crate::error::{HighlightError, Result};

/// Compile a pattern anchored at the start of the haystack.
///
/// `(?m)` makes `$` match at line ends; patterns that need `.` to cross
/// newlines opt in with `(?s)` themselves.
pub fn anchored(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?m)\A(?:{pattern})")).map_err(|source| HighlightError::Pattern {
        name: name.to_string(),
        source,
    })
}

/// Match-site condition checked after the pattern matched
#[derive(Debug, Clone)]
pub enum Guard {
    None,
    /// The byte before the match must not satisfy the predicate
    NotPrecededBy(fn(u8) -> bool),
    /// The match must start a line
    AtLineStart,
    /// Text after the match must match (anchored)
    FollowedBy(Regex),
    /// Text after the match must not match (anchored)
    NotFollowedBy(Regex),
}

impl Guard {
    fn allows(&self, input: &[u8], start: usize, end: usize) -> bool {
        match self {
            Guard::None => true,
            Guard::NotPrecededBy(pred) => start == 0 || !pred(input[start - 1]),
            Guard::AtLineStart => start == 0 || input[start - 1] == b'\n',
            Guard::FollowedBy(re) => re.is_match(&input[end..]),
            Guard::NotFollowedBy(re) => !re.is_match(&input[end..]),
        }
    }
}

/// Actions that need more than a fixed token kind and transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// `<<ID`: capture 1 is the opener, 2 the label, 3..=6 the bare name
    HeredocOpen,
    /// Compare a body line against the front of the heredoc queue
    HeredocTest,
    /// `%w(`: capture 1 is the type letter, 2 the opening delimiter
    PercentOpen,
    /// Line break; starts the bodies of heredocs opened on the line
    Newline,
}

/// What happens when a rule wins
#[derive(Debug, Clone)]
pub enum Action {
    /// Emit the whole match as one token
    Emit(TokenKind),
    /// Consume inter-token whitespace; the emitter fills the gap
    Skip,
    /// Emit capture group `i + 1` as `kinds[i]`
    Groups(Vec<TokenKind>),
    Push(StateId),
    Pop,
    /// Replace the top of the stack
    Goto(StateId),
    Hook(Hook),
    /// Apply each action in order
    Compound(Vec<Action>),
}

impl Action {
    pub fn emit_push(kind: TokenKind, state: StateId) -> Self {
        Action::Compound(vec![Action::Emit(kind), Action::Push(state)])
    }

    pub fn emit_pop(kind: TokenKind) -> Self {
        Action::Compound(vec![Action::Emit(kind), Action::Pop])
    }

    pub fn emit_goto(kind: TokenKind, state: StateId) -> Self {
        Action::Compound(vec![Action::Emit(kind), Action::Goto(state)])
    }

    pub fn groups_push(kinds: &[TokenKind], state: StateId) -> Self {
        Action::Compound(vec![Action::Groups(kinds.to_vec()), Action::Push(state)])
    }

    /// Upper bound on how many states applying this action adds to the stack
    pub fn growth(&self) -> usize {
        match self {
            Action::Push(_) => 1,
            Action::Hook(Hook::PercentOpen) => 2,
            Action::Hook(Hook::Newline) => 2,
            Action::Compound(actions) => actions.iter().map(Action::growth).sum(),
            _ => 0,
        }
    }

    fn needs_captures(&self) -> bool {
        match self {
            Action::Groups(_) | Action::Hook(_) => true,
            Action::Compound(actions) => actions.iter().any(Action::needs_captures),
            _ => false,
        }
    }
}

/// A successful rule match; all ranges are absolute input offsets
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub span: Range<usize>,
    /// Capture groups 1.., `None` where a group did not participate
    pub groups: Vec<Option<Range<usize>>>,
}

impl RuleMatch {
    pub fn group(&self, index: usize) -> Option<Range<usize>> {
        self.groups.get(index.checked_sub(1)?).cloned().flatten()
    }
}

/// A single lexer rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Name for debugging
    pub name: &'static str,
    /// Anchored pattern
    pub pattern: Regex,
    pub guard: Guard,
    pub action: Action,
}

impl Rule {
    /// Create a new rule
    pub fn new(name: &'static str, pattern: &str, action: Action) -> Result<Self> {
        Ok(Self {
            name,
            pattern: anchored(name, pattern)?,
            guard: Guard::None,
            action,
        })
    }

    /// Builder: attach a guard
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    /// Try the rule at `pos`
    pub fn match_at(&self, input: &[u8], pos: usize) -> Option<RuleMatch> {
        let haystack = &input[pos..];
        let found = if self.action.needs_captures() {
            let caps = self.pattern.captures(haystack)?;
            let whole = caps.get(0)?;
            let groups = caps
                .iter()
                .skip(1)
                .map(|m| m.map(|m| pos + m.start()..pos + m.end()))
                .collect();
            RuleMatch {
                span: pos + whole.start()..pos + whole.end(),
                groups,
            }
        } else {
            let m = self.pattern.find(haystack)?;
            RuleMatch {
                span: pos + m.start()..pos + m.end(),
                groups: Vec::new(),
            }
        };

        if self.guard.allows(input, found.span.start, found.span.end) {
            Some(found)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_is_anchored() {
        let rule = Rule::new("number", r"\d+", Action::Emit(TokenKind::Integer)).unwrap();
        assert_eq!(rule.match_at(b"abc 123", 0).map(|m| m.span), None);
        assert_eq!(rule.match_at(b"abc 123", 4).map(|m| m.span), Some(4..7));
    }

    #[test]
    fn test_dollar_matches_line_end() {
        let rule = Rule::new("comment", r"#.*$", Action::Emit(TokenKind::Comment)).unwrap();
        assert_eq!(rule.match_at(b"# hi\nx", 0).map(|m| m.span), Some(0..4));
    }

    #[test]
    fn test_groups_are_absolute() {
        let rule = Rule::new(
            "def",
            r"(def\b)(\s*)",
            Action::Groups(vec![TokenKind::Keyword, TokenKind::Whitespace]),
        )
        .unwrap();
        let m = rule.match_at(b"  def  foo", 2).unwrap();
        assert_eq!(m.span, 2..7);
        assert_eq!(m.group(1), Some(2..5));
        assert_eq!(m.group(2), Some(5..7));
        assert_eq!(m.group(0), None);
        assert_eq!(m.group(3), None);
    }

    #[test]
    fn test_guards() {
        let not_after_dot = Rule::new("word", r"[a-z]+", Action::Emit(TokenKind::Builtin))
            .unwrap()
            .with_guard(Guard::NotPrecededBy(|b| b == b'.'));
        assert!(not_after_dot.match_at(b"a.puts", 2).is_none());
        assert!(not_after_dot.match_at(b"a puts", 2).is_some());

        let keyword = Rule::new("kw", r"if", Action::Emit(TokenKind::Keyword))
            .unwrap()
            .with_guard(Guard::NotFollowedBy(anchored("w", r"\w").unwrap()));
        assert!(keyword.match_at(b"if x", 0).is_some());
        assert!(keyword.match_at(b"ifx", 0).is_none());
        assert!(keyword.match_at(b"if", 0).is_some());

        let at_start = Rule::new("doc", r"=begin", Action::Emit(TokenKind::EmbeddedDoc))
            .unwrap()
            .with_guard(Guard::AtLineStart);
        assert!(at_start.match_at(b"x\n=begin", 2).is_some());
        assert!(at_start.match_at(b"x =begin", 2).is_none());
    }

    #[test]
    fn test_invalid_pattern_reports_rule() {
        let err = Rule::new("broken", r"(", Action::Pop).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_growth() {
        assert_eq!(Action::Emit(TokenKind::Operator).growth(), 0);
        assert_eq!(
            Action::Compound(vec![Action::Push(StateId::Ternary), Action::Push(StateId::ExprStart)])
                .growth(),
            2
        );
        assert_eq!(Action::Goto(StateId::ExprStart).growth(), 0);
        assert_eq!(Action::Hook(Hook::HeredocOpen).growth(), 0);
        assert_eq!(Action::Hook(Hook::Newline).growth(), 2);
    }
}
