//! Ruby rule tables
//!
//! Each state is an ordered rule list; the first rule that matches at the
//! cursor wins. Shared rule groups (whitespace, strings, interpolation, ...)
//! are mixed into several states by concatenation.

use std::collections::HashMap;
use std::sync::Arc;

use super::rules::{anchored, Action, Guard, Hook, Rule};
use super::state::{Delimiter, StateId};
use super::tokens::{Flavor, TokenKind};
use crate::error::Result;

const KEYWORDS: &[&str] = &[
    "BEGIN", "END", "alias", "begin", "break", "case", "do", "else", "elsif", "end", "ensure",
    "for", "if", "in", "next", "redo", "rescue", "raise", "retry", "return", "super", "then",
    "undef", "unless", "until", "when", "while", "yield",
];

const PSEUDO_KEYWORDS: &[&str] = &[
    "loop", "include", "extend", "raise", "alias_method", "attr", "catch", "throw", "private",
    "module_function", "public", "protected", "true", "false", "nil", "__FILE__", "__LINE__",
];

/// Builtins usable as bare method calls
const BUILTINS: &[&str] = &[
    "attr_reader", "attr_writer", "attr_accessor", "__id__", "__send__", "abort", "ancestors",
    "at_exit", "autoload", "binding", "callcc", "caller", "catch", "chomp", "chop", "class_eval",
    "class_variables", "clone", "const_get", "const_missing", "const_set",
    "constants", "display", "dup", "eval", "exec", "exit", "extend", "fail", "fork", "format",
    "freeze", "getc", "gets", "global_variables", "gsub", "hash", "id", "included_modules",
    "inspect", "instance_eval", "instance_method", "instance_methods", "instance_variable_get",
    "instance_variable_set", "instance_variables", "lambda", "load", "local_variables", "loop",
    "method", "method_missing", "methods", "module_eval", "name", "object_id", "open", "p",
    "print", "printf", "private_class_method", "private_instance_methods", "private_methods",
    "proc", "protected_instance_methods", "protected_methods", "public_class_method",
    "public_instance_methods", "public_methods", "putc", "puts", "raise", "rand", "readline",
    "readlines", "require", "require_relative", "scan", "select", "self", "send",
    "set_trace_func", "singleton_methods", "sleep", "split", "sprintf", "srand", "sub",
    "syscall", "system", "taint", "test", "throw", "to_a", "to_s", "trace_var", "trap",
    "untaint", "untrace_var", "warn",
];

/// Builtin predicates, matched with their trailing `?`
const BUILTIN_PREDICATES: &[&str] = &[
    "autoload", "block_given", "const_defined", "eql", "equal", "frozen", "include",
    "instance_of", "is_a", "iterator", "kind_of", "method_defined", "nil",
    "private_method_defined", "protected_method_defined", "public_method_defined",
    "respond_to", "tainted",
];

/// Builtin mutators, matched with their trailing `!`
const BUILTIN_BANGS: &[&str] = &["chomp", "chop", "exit", "gsub", "sub"];

/// `a|b|c` with each word escaped
fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|")
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Build the rule list of every fixed state
pub fn state_table() -> Result<HashMap<StateId, Arc<[Rule]>>> {
    let mut table: HashMap<StateId, Arc<[Rule]>> = HashMap::new();
    let mut add = |state: StateId, rules: Vec<Rule>| {
        table.insert(state, rules.into());
    };

    add(StateId::Root, root()?);
    add(StateId::ExprStart, expr_start()?);
    add(StateId::MethodCall, method_call()?);
    add(StateId::MethodCallSpaced, method_call_spaced()?);
    add(StateId::Ternary, ternary()?);
    add(StateId::DefExpr, def_expr()?);
    add(StateId::Braced, braced()?);
    add(StateId::InInterp, in_interp()?);
    add(StateId::FuncName, func_name()?);
    add(StateId::ClassName, class_name()?);
    add(StateId::ResolveHeredocs, resolve_heredocs()?);
    add(StateId::TestHeredoc, test_heredoc()?);
    add(StateId::SlashRegex, slash_regex()?);
    add(StateId::RegexFlags, regex_flags()?);
    add(StateId::EndPart, end_part()?);
    for flavor in [Flavor::Double, Flavor::Symbol, Flavor::Backtick] {
        add(StateId::Quoted(flavor), quoted(flavor)?);
    }

    Ok(table)
}

fn inline_whitespace() -> Result<Vec<Rule>> {
    Ok(vec![Rule::new("inline_whitespace", r"[ \t\r]+", Action::Skip)?])
}

fn whitespace() -> Result<Vec<Rule>> {
    let mut rules = inline_whitespace()?;
    rules.push(Rule::new("newline", r"\n(?-u:\s)*", Action::Hook(Hook::Newline))?);
    rules.push(Rule::new("comment", r"#(?-u:[^\n])*", Action::Emit(TokenKind::Comment))?);
    rules.push(
        Rule::new(
            "embedded_doc",
            r"(?s:=begin\b.*?\n=end\b)[^\n]*",
            Action::Emit(TokenKind::EmbeddedDoc),
        )?
        .with_guard(Guard::AtLineStart),
    );
    // Unterminated: the document runs to the end of input
    rules.push(
        Rule::new(
            "embedded_doc_open",
            r"(?s-u:=begin\b.*)",
            Action::Emit(TokenKind::EmbeddedDoc),
        )?
        .with_guard(Guard::AtLineStart),
    );
    Ok(rules)
}

fn interpolation() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new(
            "interpolation",
            r"#\{",
            Action::Compound(vec![
                Action::Emit(TokenKind::InterpolationBegin),
                Action::Push(StateId::InInterp),
                Action::Push(StateId::ExprStart),
            ]),
        )?,
        Rule::new(
            "interpolated_variable",
            r"#(?:@@?|\$)[a-zA-Z_]\w*",
            Action::Emit(TokenKind::InterpolatedVariable),
        )?,
    ])
}

fn interpolation_and_escapes() -> Result<Vec<Rule>> {
    let mut rules = interpolation()?;
    rules.push(Rule::new(
        "escape",
        r#"\\(?:[\\abefnrstv#"']|x[a-fA-F0-9]{1,2}|[0-7]{1,3})"#,
        Action::Emit(TokenKind::Escape),
    )?);
    rules.push(Rule::new("escape_any", r"\\.", Action::Emit(TokenKind::Escape))?);
    Ok(rules)
}

fn symbols() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new("symbol", r":@{0,2}[a-zA-Z_]\w*[!?]?", Action::Emit(TokenKind::Symbol))?,
        Rule::new(
            "operator_symbol",
            r":(?:\*\*|[-+]@|[/%&|^`~]|\[\]=?|<<|>>|<=?>|<=?|===?)",
            Action::Emit(TokenKind::Symbol),
        )?,
        Rule::new(
            "quoted_symbol",
            r":'(?:\\\\|\\'|[^'])*'?",
            Action::Emit(TokenKind::Symbol),
        )?,
        Rule::new(
            "interpolated_symbol",
            r#":""#,
            Action::emit_push(
                TokenKind::StringBegin(Flavor::Symbol),
                StateId::Quoted(Flavor::Symbol),
            ),
        )?,
    ])
}

fn strings() -> Result<Vec<Rule>> {
    let mut rules = symbols()?;
    rules.push(Rule::new(
        "label",
        r"([a-z_]\w*?[?!]?:)(\s+)",
        Action::Compound(vec![
            Action::Groups(vec![TokenKind::Label, TokenKind::Whitespace]),
            Action::Push(StateId::ExprStart),
        ]),
    )?);
    rules.push(Rule::new(
        "single_quoted",
        r"'(?:\\\\|\\'|[^'])*'?",
        Action::Emit(TokenKind::StringLiteral(Flavor::Single)),
    )?);
    rules.push(Rule::new(
        "double_quoted",
        r#"""#,
        Action::emit_push(
            TokenKind::StringBegin(Flavor::Double),
            StateId::Quoted(Flavor::Double),
        ),
    )?);
    rules.push(
        Rule::new(
            "backtick",
            r"`",
            Action::emit_push(
                TokenKind::StringBegin(Flavor::Backtick),
                StateId::Quoted(Flavor::Backtick),
            ),
        )?
        .with_guard(Guard::NotPrecededBy(|b| b == b'.')),
    );
    Ok(rules)
}

fn percent_literals() -> Result<Vec<Rule>> {
    Ok(vec![Rule::new(
        "percent_literal",
        r"%([rqswQWxiI])?([[:punct:]&&[^_]])",
        Action::Hook(Hook::PercentOpen),
    )?])
}

fn heredoc_openers() -> Result<Vec<Rule>> {
    Ok(vec![Rule::new(
        "heredoc",
        r#"(<<[-~]?)("([a-zA-Z_]\w*)?"|'([a-zA-Z_]\w*)?'|`([a-zA-Z_]\w*)`|([a-zA-Z_]\w*))"#,
        Action::Hook(Hook::HeredocOpen),
    )?
    .with_guard(Guard::NotPrecededBy(is_word_byte))])
}

fn root() -> Result<Vec<Rule>> {
    let mut rules = whitespace()?;

    rules.push(
        Rule::new(
            "end_marker",
            r"__END__\r?$",
            Action::emit_push(TokenKind::EndMarker, StateId::EndPart),
        )?
        .with_guard(Guard::AtLineStart),
    );

    // Numbers
    rules.push(Rule::new("octal", r"0_?[0-7]+(?:_[0-7]+)*", Action::Emit(TokenKind::Octal))?);
    rules.push(Rule::new(
        "hex",
        r"0x[0-9A-Fa-f]+(?:_[0-9A-Fa-f]+)*",
        Action::Emit(TokenKind::Hex),
    )?);
    rules.push(Rule::new("binary", r"0b[01]+(?:_[01]+)*", Action::Emit(TokenKind::Binary))?);
    rules.push(Rule::new(
        "float",
        r"[0-9]+(?:_[0-9]+)*(?:\.[0-9]+(?:_[0-9]+)*(?:[eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)",
        Action::Emit(TokenKind::Float),
    )?);
    rules.push(Rule::new("integer", r"[0-9]+(?:_[0-9]+)*", Action::Emit(TokenKind::Integer))?);

    // Variables
    rules.push(Rule::new(
        "class_variable",
        r"@@[a-zA-Z_]\w*",
        Action::Emit(TokenKind::ClassVariable),
    )?);
    rules.push(Rule::new(
        "instance_variable",
        r"@[a-zA-Z_]\w*",
        Action::Emit(TokenKind::InstanceVariable),
    )?);
    rules.push(Rule::new("global_variable", r"\$\w+", Action::Emit(TokenKind::GlobalVariable))?);
    rules.push(Rule::new(
        "special_global",
        r#"\$[!@&`'+~=/\\,;.<>_*$?:"]"#,
        Action::Emit(TokenKind::GlobalVariable),
    )?);
    rules.push(Rule::new(
        "option_global",
        r"\$-[0adFiIlpvw]",
        Action::Emit(TokenKind::GlobalVariable),
    )?);
    rules.push(Rule::new("scope", r"::", Action::Emit(TokenKind::Operator))?);

    rules.extend(strings()?);

    // Words
    rules.push(Rule::new(
        "keyword",
        &format!(r"(?:defined\?|(?:{})\b)", alternation(KEYWORDS)),
        Action::emit_push(TokenKind::Keyword, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "pseudo_keyword",
        &format!(r"(?:{})\b", alternation(PSEUDO_KEYWORDS)),
        Action::emit_push(TokenKind::PseudoKeyword, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "word_operator",
        r"(?:not|and|or)\b",
        Action::emit_push(TokenKind::WordOperator, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "module",
        r"(module)(\s+)([a-zA-Z_][a-zA-Z0-9_]*(?:::[a-zA-Z_][a-zA-Z0-9_]*)*)",
        Action::Groups(vec![TokenKind::Keyword, TokenKind::Whitespace, TokenKind::ModuleName]),
    )?);
    rules.push(Rule::new(
        "def",
        r"(def\b)(\s*)",
        Action::groups_push(&[TokenKind::Keyword, TokenKind::Whitespace], StateId::FuncName),
    )?);
    rules.push(Rule::new(
        "class",
        r"(class\b)(\s*)",
        Action::groups_push(&[TokenKind::Keyword, TokenKind::Whitespace], StateId::ClassName),
    )?);
    rules.push(Rule::new(
        "builtin_predicate",
        &format!(r"(?:{})\?", alternation(BUILTIN_PREDICATES)),
        Action::emit_push(TokenKind::Builtin, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "builtin_bang",
        &format!(r"(?:{})!", alternation(BUILTIN_BANGS)),
        Action::emit_push(TokenKind::Builtin, StateId::ExprStart),
    )?);
    rules.push(
        Rule::new(
            "builtin",
            &format!(r"(?:{})\b", alternation(BUILTINS)),
            Action::emit_push(TokenKind::Builtin, StateId::MethodCall),
        )?
        .with_guard(Guard::NotPrecededBy(|b| b == b'.')),
    );

    rules.extend(heredoc_openers()?);

    // `..` and `...` before `.`, which would start a method call
    rules.push(Rule::new(
        "range",
        r"\.{2,3}",
        Action::emit_push(TokenKind::Operator, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "constant",
        r"[A-Z][a-zA-Z0-9_]*",
        Action::emit_push(TokenKind::Constant, StateId::MethodCall),
    )?);
    rules.push(Rule::new(
        "method_call",
        r"(\.|::)(\s*)([a-z_]\w*[!?]?|[*%&^`~+\-/\[<>=])",
        Action::groups_push(
            &[TokenKind::Punctuation, TokenKind::Whitespace, TokenKind::MethodName],
            StateId::MethodCall,
        ),
    )?);
    rules.push(
        Rule::new(
            "predicate_name",
            r"[a-zA-Z_]\w*[?!]",
            Action::emit_push(TokenKind::Identifier, StateId::ExprStart),
        )?
        .with_guard(Guard::NotFollowedBy(anchored("predicate_name", r"=[^=~]")?)),
    );
    rules.push(Rule::new(
        "name",
        r"[a-zA-Z_]\w*",
        Action::emit_push(TokenKind::Identifier, StateId::MethodCall),
    )?);

    // Longer operators before their prefixes
    rules.push(Rule::new(
        "operator",
        r"\*\*|<=>|===|==|=>|->|<<|>>|<=|>=|=~|!~|&&|\|\||<|>|&|\.",
        Action::emit_push(TokenKind::Operator, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "assign_operator",
        r"[-+/*%=<>&!^|~]=?",
        Action::emit_push(TokenKind::Operator, StateId::ExprStart),
    )?);
    rules.push(Rule::new(
        "ternary",
        r"\?",
        Action::Compound(vec![
            Action::Emit(TokenKind::Punctuation),
            Action::Push(StateId::Ternary),
            Action::Push(StateId::ExprStart),
        ]),
    )?);
    rules.push(Rule::new(
        "open_brace",
        r"\{",
        Action::Compound(vec![
            Action::Emit(TokenKind::Punctuation),
            Action::Push(StateId::Braced),
            Action::Push(StateId::ExprStart),
        ]),
    )?);
    rules.push(Rule::new(
        "open_punctuation",
        r"[\[(,:\\;]",
        Action::emit_push(TokenKind::Punctuation, StateId::ExprStart),
    )?);
    rules.push(Rule::new("close_punctuation", r"[\])}]", Action::Emit(TokenKind::Punctuation))?);

    Ok(rules)
}

fn expr_start() -> Result<Vec<Rule>> {
    let mut rules = inline_whitespace()?;
    rules.push(Rule::new(
        "regex",
        r"/",
        Action::emit_goto(TokenKind::StringBegin(Flavor::Regex), StateId::SlashRegex),
    )?);
    // `?x` is a character unless it runs into a word, as in `x>=0?n[x]:""`
    rules.push(
        Rule::new(
            "char",
            r#"\?(?:\\[MC]-)*(?:\\(?:[\\abefnrstv#"']|x[a-fA-F0-9]{1,2}|[0-7]{1,3})|\S)"#,
            Action::emit_pop(TokenKind::CharLiteral),
        )?
        .with_guard(Guard::NotFollowedBy(anchored("char", r"\w")?)),
    );
    // `% foo ` uses a space as its delimiter and cannot span lines
    rules.push(Rule::new(
        "space_percent_literal",
        r"([ \t]*)(%[rqswQWxiI]? \S* )",
        Action::Compound(vec![
            Action::Groups(vec![TokenKind::Whitespace, TokenKind::StringLiteral(Flavor::Other)]),
            Action::Pop,
        ]),
    )?);
    rules.extend(percent_literals()?);
    rules.push(Rule::new("done", r"", Action::Pop)?);
    Ok(rules)
}

fn method_call() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new(
            "divide",
            r"/|%",
            Action::emit_goto(TokenKind::Operator, StateId::ExprStart),
        )?,
        Rule::new("line_end", r"", Action::Pop)?
            .with_guard(Guard::FollowedBy(anchored("line_end", r"\n")?)),
        Rule::new("spaced", r"", Action::Goto(StateId::MethodCallSpaced))?,
    ])
}

fn method_call_spaced() -> Result<Vec<Rule>> {
    let mut rules = whitespace()?;
    rules.push(Rule::new(
        "assign_divide",
        r"[%/]=",
        Action::emit_goto(TokenKind::Operator, StateId::ExprStart),
    )?);
    // `foo /x/` passes a regex, `foo / x` divides
    rules.push(
        Rule::new(
            "regex_argument",
            r"/",
            Action::emit_goto(TokenKind::StringBegin(Flavor::Regex), StateId::SlashRegex),
        )?
        .with_guard(Guard::FollowedBy(anchored("regex_argument", r"\S|\s*/")?)),
    );
    rules.extend(percent_literals()?);
    rules.push(
        Rule::new("divide_ahead", r"", Action::Pop)?
            .with_guard(Guard::FollowedBy(anchored("divide_ahead", r"\s*/")?)),
    );
    rules.push(Rule::new(
        "argument_space",
        r"\s+",
        Action::emit_goto(TokenKind::Whitespace, StateId::ExprStart),
    )?);
    rules.push(Rule::new("done", r"", Action::Pop)?);
    Ok(rules)
}

fn ternary() -> Result<Vec<Rule>> {
    let mut rules = vec![
        Rule::new(
            "ternary_else",
            r"(:)(\s+)",
            Action::Compound(vec![
                Action::Groups(vec![TokenKind::Punctuation, TokenKind::Whitespace]),
                Action::Goto(StateId::ExprStart),
            ]),
        )?,
        Rule::new(
            "ternary_else_tight",
            r":",
            Action::emit_goto(TokenKind::Punctuation, StateId::ExprStart),
        )?
        .with_guard(Guard::NotFollowedBy(anchored("ternary_else_tight", r"[^#\n]*?[:\\]")?)),
    ];
    rules.extend(root()?);
    Ok(rules)
}

fn def_expr() -> Result<Vec<Rule>> {
    let mut rules = vec![
        Rule::new(
            "close_paren",
            r"(\))(\.|::)?",
            Action::Compound(vec![
                Action::Groups(vec![TokenKind::Punctuation, TokenKind::Operator]),
                Action::Pop,
            ]),
        )?,
        Rule::new(
            "open_paren",
            r"\(",
            Action::Compound(vec![
                Action::Emit(TokenKind::Punctuation),
                Action::Push(StateId::DefExpr),
                Action::Push(StateId::ExprStart),
            ]),
        )?,
    ];
    rules.extend(root()?);
    Ok(rules)
}

fn braced() -> Result<Vec<Rule>> {
    let mut rules = vec![Rule::new(
        "close_brace",
        r"\}",
        Action::emit_pop(TokenKind::Punctuation),
    )?];
    rules.extend(root()?);
    Ok(rules)
}

fn in_interp() -> Result<Vec<Rule>> {
    let mut rules = vec![Rule::new(
        "interpolation_end",
        r"\}",
        Action::emit_pop(TokenKind::InterpolationEnd),
    )?];
    rules.extend(root()?);
    Ok(rules)
}

fn func_name() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new("space", r"\s+", Action::Emit(TokenKind::Whitespace))?,
        Rule::new(
            "params",
            r"\(",
            Action::emit_push(TokenKind::Punctuation, StateId::DefExpr),
        )?,
        Rule::new(
            "method_name",
            r"(?:([a-zA-Z_]\w*)(\.))?([a-zA-Z_]\w*[!?=]?|\*\*?|[-+]@?|[/%&|^`~]|\[\]=?|<=>|===?|<<?|>>?|<=|>=)",
            Action::Compound(vec![
                Action::Groups(vec![TokenKind::ClassName, TokenKind::Operator, TokenKind::MethodName]),
                Action::Pop,
            ]),
        )?,
        Rule::new("done", r"", Action::Pop)?,
    ])
}

fn class_name() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new("space", r"\s+", Action::Emit(TokenKind::Whitespace))?,
        Rule::new("scoped_name", r"\w+(?:::\w+)+", Action::Emit(TokenKind::ClassName))?,
        Rule::new(
            "superclass_expr",
            r"\(",
            Action::Compound(vec![
                Action::Emit(TokenKind::Punctuation),
                Action::Push(StateId::DefExpr),
                Action::Push(StateId::ExprStart),
            ]),
        )?,
        // class << self
        Rule::new(
            "singleton",
            r"<<",
            Action::emit_goto(TokenKind::Operator, StateId::ExprStart),
        )?,
        Rule::new("class_name", r"[A-Z_]\w*", Action::emit_pop(TokenKind::ClassName))?,
        Rule::new("done", r"", Action::Pop)?,
    ])
}

fn resolve_heredocs() -> Result<Vec<Rule>> {
    let body = TokenKind::StringContent(Flavor::Heredoc);
    let mut rules = interpolation_and_escapes()?;
    rules.push(Rule::new(
        "body_newline",
        r"\n",
        Action::emit_push(body, StateId::TestHeredoc),
    )?);
    rules.push(Rule::new("body_marker", r"[#\\]", Action::Emit(body))?);
    rules.push(Rule::new("body_text", r"(?-u:[^#\\\n])+", Action::Emit(body))?);
    Ok(rules)
}

fn test_heredoc() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new("body_line", r"(?-u:[^#\\\n])*$", Action::Hook(Hook::HeredocTest))?,
        Rule::new("done", r"", Action::Pop)?,
    ])
}

fn slash_regex() -> Result<Vec<Rule>> {
    let body = TokenKind::StringContent(Flavor::Regex);
    let mut rules = interpolation()?;
    rules.push(Rule::new("escaped_backslash", r"\\\\", Action::Emit(body))?);
    rules.push(Rule::new("escaped_slash", r"\\/", Action::Emit(body))?);
    rules.push(Rule::new("regex_marker", r"[\\#]", Action::Emit(body))?);
    rules.push(Rule::new("regex_text", r"(?-u:[^\\/#])+", Action::Emit(body))?);
    rules.push(Rule::new(
        "regex_end",
        r"/",
        Action::emit_goto(TokenKind::StringEnd(Flavor::Regex), StateId::RegexFlags),
    )?);
    Ok(rules)
}

fn regex_flags() -> Result<Vec<Rule>> {
    Ok(vec![Rule::new(
        "regex_flags",
        r"[mixounse]*",
        Action::emit_pop(TokenKind::RegexOptions),
    )?])
}

fn end_part() -> Result<Vec<Rule>> {
    Ok(vec![Rule::new(
        "data",
        r"(?s-u:.+)",
        Action::emit_pop(TokenKind::DataSection),
    )?])
}

/// Bodies of `"..."`, `:"..."` and backticks
fn quoted(flavor: Flavor) -> Result<Vec<Rule>> {
    let fin = if flavor == Flavor::Backtick { "`" } else { "\"" };
    let mut rules = interpolation_and_escapes()?;
    rules.push(Rule::new(
        "string_text",
        &format!(r"(?-u:[^\\{fin}#])+"),
        Action::Emit(TokenKind::StringContent(flavor)),
    )?);
    rules.push(Rule::new(
        "string_marker",
        r"[\\#]",
        Action::Emit(TokenKind::StringContent(flavor)),
    )?);
    rules.push(Rule::new(
        "string_end",
        fin,
        Action::emit_pop(TokenKind::StringEnd(flavor)),
    )?);
    Ok(rules)
}

/// Bodies of percent-literals, built per delimiter
pub fn delimited(delimiter: Delimiter) -> Result<Vec<Rule>> {
    let flavor = delimiter.flavor;
    let open = regex::escape(&delimiter.open.to_string());
    let close = regex::escape(&delimiter.close.to_string());
    let specials = format!(r"\#{open}{close}\\");

    let mut rules = vec![Rule::new(
        "delimiter_escape",
        &format!(r"\\[{specials}]"),
        Action::Emit(TokenKind::Escape),
    )?];
    if delimiter.nests() {
        rules.push(Rule::new(
            "nested_open",
            &open,
            Action::emit_push(TokenKind::StringBegin(flavor), StateId::Delimited(delimiter)),
        )?);
    }
    rules.push(Rule::new(
        "delimiter_close",
        &close,
        Action::emit_pop(TokenKind::StringEnd(flavor)),
    )?);
    if delimiter.interpolate {
        rules.extend(interpolation_and_escapes()?);
        rules.push(Rule::new("literal_hash", r"#", Action::Emit(TokenKind::StringContent(flavor)))?);
    } else {
        rules.push(Rule::new(
            "literal_marker",
            r"[\\#]",
            Action::Emit(TokenKind::StringContent(flavor)),
        )?);
    }
    rules.push(Rule::new(
        "literal_text",
        &format!(r"(?-u:[^{specials}])+"),
        Action::Emit(TokenKind::StringContent(flavor)),
    )?);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_table_builds() {
        let table = state_table().unwrap();
        assert!(table.contains_key(&StateId::Root));
        assert!(table.contains_key(&StateId::Quoted(Flavor::Backtick)));
        assert!(table.values().all(|rules| !rules.is_empty()));
    }

    #[test]
    fn test_delimited_rules_build_for_every_delimiter() {
        for open in "!\"#$%&'()*+,-./:;<=>?@[\\]^`{|}~".chars() {
            for (interpolate, flavor) in [(true, Flavor::Other), (false, Flavor::Other), (true, Flavor::Regex)] {
                let delimiter = Delimiter::new(open, interpolate, flavor);
                assert!(delimited(delimiter).is_ok(), "delimiter {open:?}");
            }
        }
    }

    #[test]
    fn test_keyword_prefers_longest() {
        let rules = root().unwrap();
        let keyword = rules.iter().find(|r| r.name == "keyword").unwrap();
        assert_eq!(keyword.match_at(b"elsif x", 0).map(|m| m.span), Some(0..5));
        assert_eq!(keyword.match_at(b"defined?(x)", 0).map(|m| m.span), Some(0..8));
        assert!(keyword.match_at(b"endless", 0).is_none());
    }

    #[test]
    fn test_alternation_escapes() {
        assert_eq!(alternation(&["a?", "b"]), r"a\?|b");
    }
}
