//! Lexer states and the state stack

use super::tokens::Flavor;

/// Parameters of a percent-literal body such as `%w(...)` or `%r{...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiter {
    pub open: char,
    pub close: char,
    /// Whether `#{...}` and escapes are recognized in the body
    pub interpolate: bool,
    pub flavor: Flavor,
}

impl Delimiter {
    pub fn new(open: char, interpolate: bool, flavor: Flavor) -> Self {
        let close = match open {
            '(' => ')',
            '[' => ']',
            '{' => '}',
            '<' => '>',
            other => other,
        };
        Self {
            open,
            close,
            interpolate,
            flavor,
        }
    }

    /// Bracket delimiters nest: `%w(a (b) c)` is one literal
    pub fn nests(&self) -> bool {
        self.open != self.close
    }
}

/// Named lexer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    /// Statement level
    Root,
    /// An operand is expected: `/` starts a regex, `?x` is a char literal
    ExprStart,
    /// Right after a value: `/` and `%` are operators
    MethodCall,
    /// A value followed by whitespace: `foo /re/` passes a regex argument
    MethodCallSpaced,
    /// Inside `cond ? a : b`, waiting for the `:`
    Ternary,
    /// Parenthesized parameter list or superclass expression
    DefExpr,
    /// Inside `{ ... }`
    Braced,
    /// Inside `#{ ... }`
    InInterp,
    /// After `def`
    FuncName,
    /// After `class`
    ClassName,
    /// Heredoc bodies
    ResolveHeredocs,
    /// Start of a heredoc body line, checking for the terminator
    TestHeredoc,
    /// `/.../` body
    SlashRegex,
    /// Option letters after a regex
    RegexFlags,
    /// Everything after `__END__`
    EndPart,
    /// `"..."`, `:"..."` and backtick bodies
    Quoted(Flavor),
    /// Percent-literal bodies
    Delimited(Delimiter),
}

/// Stack of active lexer states
///
/// The bottom entry is never popped, so the stack is never empty.
#[derive(Debug, Clone)]
pub struct StateStack {
    states: Vec<StateId>,
}

impl StateStack {
    /// A stack holding only `bottom`
    pub fn new(bottom: StateId) -> Self {
        Self {
            states: vec![bottom],
        }
    }

    /// The state the scanner currently runs against
    pub fn top(&self) -> StateId {
        // The bottom entry is never removed
        self.states[self.states.len() - 1]
    }

    pub fn push(&mut self, state: StateId) {
        self.states.push(state);
    }

    /// Pop the top state. Refuses to pop the bottom entry.
    pub fn pop(&mut self) -> Option<StateId> {
        if self.states.len() > 1 {
            self.states.pop()
        } else {
            None
        }
    }

    /// Replace the top state
    pub fn goto(&mut self, state: StateId) {
        let top = self.states.len() - 1;
        self.states[top] = state;
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_is_never_popped() {
        let mut stack = StateStack::new(StateId::Root);
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.top(), StateId::Root);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_push_pop_goto() {
        let mut stack = StateStack::new(StateId::Root);
        stack.push(StateId::ExprStart);
        assert_eq!(stack.top(), StateId::ExprStart);

        stack.goto(StateId::SlashRegex);
        assert_eq!(stack.top(), StateId::SlashRegex);
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop(), Some(StateId::SlashRegex));
        assert_eq!(stack.top(), StateId::Root);
    }

    #[test]
    fn test_delimiter_pairs() {
        let paren = Delimiter::new('(', false, Flavor::Other);
        assert_eq!(paren.close, ')');
        assert!(paren.nests());

        let angle = Delimiter::new('<', true, Flavor::Other);
        assert_eq!(angle.close, '>');

        let bar = Delimiter::new('|', true, Flavor::Regex);
        assert_eq!(bar.close, '|');
        assert!(!bar.nests());
    }
}
