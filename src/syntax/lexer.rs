//! The Ruby lexer
//!
//! [`RubyLexer`] owns the compiled rule tables and is shared freely; every
//! call to [`RubyLexer::tokenize`] gets its own [`Tokens`] iterator carrying
//! the per-scan context: cursor, state stack, heredoc queue and emitter.

use std::collections::HashMap;
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::emitter::Emitter;
use super::heredoc::HeredocQueue;
use super::ruby;
use super::rules::{Action, Hook, Rule, RuleMatch};
use super::state::{Delimiter, StateId, StateStack};
use super::tokens::{Flavor, Token, TokenKind};
use crate::error::Result;

/// Default cap on the state stack depth
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Zero-length steps allowed in a row before input is forced forward
const MAX_IDLE_STEPS: usize = 16;

/// Tunables for a lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// Pushes beyond this depth emit their match as unrecognized input
    pub max_depth: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compiled Ruby tokenizer
#[derive(Debug, Clone)]
pub struct RubyLexer {
    states: HashMap<StateId, Arc<[Rule]>>,
    options: LexerOptions,
}

impl RubyLexer {
    pub fn new() -> Result<Self> {
        Self::with_options(LexerOptions::default())
    }

    pub fn with_options(options: LexerOptions) -> Result<Self> {
        let states = ruby::state_table()?;
        debug!(states = states.len(), max_depth = options.max_depth, "compiled lexer");
        Ok(Self { states, options })
    }

    pub fn options(&self) -> LexerOptions {
        self.options
    }

    /// Tokenize `input`.
    ///
    /// The returned iterator yields tokens lazily; their texts concatenate
    /// back to `input`.
    pub fn tokenize<'l, 'a>(&'l self, input: &'a [u8]) -> Tokens<'l, 'a> {
        let mut stack = StateStack::new(StateId::Root);
        stack.push(StateId::ExprStart);
        Tokens {
            lexer: self,
            input,
            pos: 0,
            stack,
            heredocs: HeredocQueue::new(),
            emitter: Emitter::new(input),
            delimited: HashMap::new(),
            idle_steps: 0,
            finished: false,
        }
    }

    pub fn tokenize_str<'l, 'a>(&'l self, input: &'a str) -> Tokens<'l, 'a> {
        self.tokenize(input.as_bytes())
    }
}

/// Lazy token stream over one input
pub struct Tokens<'l, 'a> {
    lexer: &'l RubyLexer,
    input: &'a [u8],
    pos: usize,
    stack: StateStack,
    heredocs: HeredocQueue,
    emitter: Emitter<'a>,
    /// Percent-literal rules compiled on first use in this scan
    delimited: HashMap<Delimiter, Arc<[Rule]>>,
    idle_steps: usize,
    finished: bool,
}

impl<'l, 'a> Tokens<'l, 'a> {
    /// Current state stack depth
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn rules_for(&mut self, state: StateId) -> Option<Arc<[Rule]>> {
        match state {
            StateId::Delimited(delimiter) => {
                if let Some(rules) = self.delimited.get(&delimiter) {
                    return Some(Arc::clone(rules));
                }
                match ruby::delimited(delimiter) {
                    Ok(rules) => {
                        let rules: Arc<[Rule]> = rules.into();
                        self.delimited.insert(delimiter, Arc::clone(&rules));
                        Some(rules)
                    }
                    Err(err) => {
                        warn!(?delimiter, %err, "failed to build percent-literal rules");
                        None
                    }
                }
            }
            other => self.lexer.states.get(&other).cloned(),
        }
    }

    /// Run one rule (or one unrecognized character) at the cursor
    fn step(&mut self) {
        let state = self.stack.top();
        let Some(rules) = self.rules_for(state) else {
            // A state without rules can never make progress
            self.stack.pop();
            self.unrecognized();
            return;
        };

        let pos = self.pos;
        for rule in rules.iter() {
            if let Some(m) = rule.match_at(self.input, pos) {
                trace!(?state, rule = rule.name, start = m.span.start, end = m.span.end, "match");
                self.apply_rule(rule, &m);
                return;
            }
        }
        self.unrecognized();
    }

    fn apply_rule(&mut self, rule: &Rule, m: &RuleMatch) {
        let growth = rule.action.growth();
        if self.stack.depth() + growth > self.lexer.options.max_depth {
            debug!(rule = rule.name, depth = self.stack.depth(), "state stack depth cap reached");
            if m.span.is_empty() {
                self.unrecognized();
            } else {
                self.emitter.emit(TokenKind::Unrecognized, m.span.start, m.span.end);
                self.advance_to(m.span.end);
            }
            return;
        }

        let end = self.apply(&rule.action, m).unwrap_or(m.span.end);
        self.advance_to(end);
    }

    /// Apply an action. Returns the cursor position when a hook consumed
    /// less than the whole match.
    fn apply(&mut self, action: &Action, m: &RuleMatch) -> Option<usize> {
        match action {
            Action::Emit(kind) => self.emitter.emit(*kind, m.span.start, m.span.end),
            Action::Skip => {}
            Action::Groups(kinds) => {
                for (index, kind) in kinds.iter().enumerate() {
                    if let Some(group) = m.group(index + 1) {
                        self.emitter.emit(*kind, group.start, group.end);
                    }
                }
            }
            Action::Push(state) => {
                trace!(?state, depth = self.stack.depth() + 1, "push");
                self.stack.push(*state);
            }
            Action::Pop => {
                let popped = self.stack.pop();
                trace!(?popped, "pop");
            }
            Action::Goto(state) => {
                trace!(?state, "goto");
                self.stack.goto(*state);
            }
            Action::Hook(hook) => return self.run_hook(*hook, m),
            Action::Compound(actions) => {
                let mut end = None;
                for action in actions {
                    end = self.apply(action, m).or(end);
                }
                return end;
            }
        }
        None
    }

    fn run_hook(&mut self, hook: Hook, m: &RuleMatch) -> Option<usize> {
        match hook {
            Hook::HeredocOpen => self.open_heredoc(m),
            Hook::HeredocTest => self.test_heredoc(m),
            Hook::PercentOpen => self.open_percent_literal(m),
            Hook::Newline => return self.newline(m),
        }
        None
    }

    /// A line break outside strings. Pending heredoc bodies start right
    /// after it; the enclosing states stay untouched until they are done.
    fn newline(&mut self, m: &RuleMatch) -> Option<usize> {
        if self.heredocs.is_empty() {
            self.stack.push(StateId::ExprStart);
            return None;
        }
        let end = m.span.start + 1;
        trace!(pending = self.heredocs.len(), depth = self.stack.depth(), "heredoc bodies");
        self.emitter
            .emit(TokenKind::StringContent(Flavor::Heredoc), m.span.start, end);
        self.stack.push(StateId::ResolveHeredocs);
        self.stack.push(StateId::TestHeredoc);
        Some(end)
    }

    fn open_heredoc(&mut self, m: &RuleMatch) {
        let (Some(opener), Some(label)) = (m.group(1), m.group(2)) else {
            self.emitter.emit(TokenKind::Unrecognized, m.span.start, m.span.end);
            return;
        };
        self.emitter.emit(TokenKind::HeredocOpener, opener.start, opener.end);
        self.emitter.emit(TokenKind::HeredocLabel, label.start, label.end);

        // `<<""` leaves every name group unset: the terminator is an empty line
        let name = (3..=6)
            .find_map(|index| m.group(index))
            .map_or(&b""[..], |range| &self.input[range]);
        self.heredocs.open(&self.input[opener], name);
        debug!(
            terminator = %String::from_utf8_lossy(name),
            pending = self.heredocs.len(),
            "heredoc opened"
        );
    }

    fn test_heredoc(&mut self, m: &RuleMatch) {
        let line = &self.input[m.span.clone()];
        let expected = self.heredocs.front().map(|h| h.terminator.clone());
        let closed = self.heredocs.try_close(line);
        debug!(
            line = %String::from_utf8_lossy(line),
            ?expected,
            closed,
            "heredoc terminator check"
        );

        if closed {
            self.emitter.emit(TokenKind::HeredocTerminator, m.span.start, m.span.end);
            self.stack.pop();
            if self.heredocs.is_empty() {
                self.stack.pop();
            }
        } else {
            self.emitter
                .emit(TokenKind::StringContent(Flavor::Heredoc), m.span.start, m.span.end);
            self.stack.pop();
        }
    }

    fn open_percent_literal(&mut self, m: &RuleMatch) {
        let letter = m.group(1).map(|range| self.input[range.start]);
        let Some(open) = m.group(2).map(|range| char::from(self.input[range.start])) else {
            self.emitter.emit(TokenKind::Unrecognized, m.span.start, m.span.end);
            return;
        };

        let interpolate = letter.map_or(true, |l| b"rQWxI".contains(&l));
        let flavor = if letter == Some(b'r') {
            Flavor::Regex
        } else {
            Flavor::Other
        };
        self.emitter
            .emit(TokenKind::StringBegin(flavor), m.span.start, m.span.end);

        if flavor == Flavor::Regex {
            self.stack.push(StateId::RegexFlags);
        }
        let delimiter = Delimiter::new(open, interpolate, flavor);
        trace!(?delimiter, "percent literal");
        self.stack.push(StateId::Delimited(delimiter));
    }

    /// Move the cursor, counting steps that consumed nothing
    fn advance_to(&mut self, end: usize) {
        if end > self.pos {
            self.pos = end;
            self.idle_steps = 0;
        } else {
            self.idle_steps += 1;
            if self.idle_steps > MAX_IDLE_STEPS {
                debug!(offset = self.pos, state = ?self.stack.top(), "no progress, forcing one character");
                self.unrecognized();
            }
        }
    }

    /// Emit one character (or one byte of invalid UTF-8) as unrecognized
    fn unrecognized(&mut self) {
        let len = char_len(&self.input[self.pos..]);
        trace!(offset = self.pos, len, "unrecognized input");
        self.emitter
            .emit(TokenKind::Unrecognized, self.pos, self.pos + len);
        self.pos += len;
        self.idle_steps = 0;
    }
}

/// Byte length of the character starting `bytes`; 1 for invalid UTF-8
fn char_len(bytes: &[u8]) -> usize {
    let width = match bytes.first() {
        None => return 0,
        Some(b) if *b < 0x80 => 1,
        Some(b) if *b >= 0xF0 => 4,
        Some(b) if *b >= 0xE0 => 3,
        Some(b) if *b >= 0xC0 => 2,
        Some(_) => 1,
    };
    match bytes.get(..width) {
        Some(head) if std::str::from_utf8(head).is_ok() => width,
        _ => 1,
    }
}

impl<'l, 'a> Iterator for Tokens<'l, 'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if let Some(token) = self.emitter.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            if self.pos >= self.input.len() {
                self.emitter.finish();
                self.finished = true;
                continue;
            }
            self.step();
        }
    }
}

impl FusedIterator for Tokens<'_, '_> {}
