//! Tokens from an external parse tree or lexeme stream
//!
//! Both entry points fill every gap the external structure leaves, so their
//! output concatenates back to the source just like [`RubyLexer`] output.
//!
//! [`RubyLexer`]: super::RubyLexer

use std::ops::Range;

use tracing::trace;

use super::emitter::Emitter;
use super::tokens::{Flavor, Token, TokenKind};

/// Node kinds of an external Ruby parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Terminal with a known token kind
    Leaf(TokenKind),
    Program,
    Statements,
    Call,
    Arguments,
    /// `def`, `class` or `module` body
    Definition,
    Block,
    /// String literal; gaps between its children are string body
    StringLiteral(Flavor),
    /// `#{ ... }` inside a string
    Interpolation,
    /// Heredoc body
    Heredoc,
    /// Kind the caller has no mapping for, by label
    Other(String),
}

impl NodeKind {
    /// Kind for non-whitespace gap bytes directly inside this node
    fn fallback(&self) -> TokenKind {
        match self {
            NodeKind::StringLiteral(flavor) => TokenKind::StringContent(*flavor),
            NodeKind::Heredoc => TokenKind::StringContent(Flavor::Heredoc),
            NodeKind::Leaf(kind) => *kind,
            NodeKind::Program
            | NodeKind::Statements
            | NodeKind::Call
            | NodeKind::Arguments
            | NodeKind::Definition
            | NodeKind::Block
            | NodeKind::Interpolation
            | NodeKind::Other(_) => TokenKind::Text,
        }
    }
}

/// One node of an external parse tree; spans are byte ranges of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Range<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(kind: TokenKind, span: Range<usize>) -> Self {
        Self {
            kind: NodeKind::Leaf(kind),
            span,
            children: Vec::new(),
        }
    }

    pub fn branch(kind: NodeKind, span: Range<usize>, children: Vec<Node>) -> Self {
        Self {
            kind,
            span,
            children,
        }
    }
}

/// Classify an unmapped leaf from its label
fn classify_label(label: &str) -> TokenKind {
    match label.to_ascii_lowercase().as_str() {
        "identifier" | "name" => TokenKind::Identifier,
        "constant" => TokenKind::Constant,
        "string" | "string_content" => TokenKind::StringContent(Flavor::Plain),
        "comment" => TokenKind::Comment,
        _ => {
            trace!(label, "unmapped node label");
            TokenKind::Text
        }
    }
}

fn walk(emitter: &mut Emitter<'_>, node: &Node) {
    let Range { start, end } = node.span;
    match &node.kind {
        NodeKind::Leaf(kind) => emitter.emit(*kind, start, end),
        NodeKind::Other(label) if node.children.is_empty() => {
            emitter.emit(classify_label(label), start, end)
        }
        kind => {
            let fallback = kind.fallback();
            let mut children: Vec<&Node> = node.children.iter().collect();
            children.sort_by_key(|child| child.span.start);
            for child in children {
                emitter.fill(child.span.start.min(end), fallback);
                walk(emitter, child);
            }
            emitter.fill(end, fallback);
        }
    }
}

/// Tokens for `source` as described by the tree rooted at `root`
pub fn tokenize_tree<'a>(source: &'a [u8], root: &Node) -> Vec<Token<'a>> {
    let mut emitter = Emitter::new(source);
    emitter.fill(root.span.start, TokenKind::Text);
    walk(&mut emitter, root);
    emitter.finish();
    emitter.drain()
}

/// Tokens for `source` from a flat `(kind, span)` stream.
///
/// Spans overlapping an earlier one are clipped; gaps become whitespace or
/// [`TokenKind::Text`].
pub fn tokenize_lexemes<'a, I>(source: &'a [u8], lexemes: I) -> Vec<Token<'a>>
where
    I: IntoIterator<Item = (TokenKind, Range<usize>)>,
{
    let mut emitter = Emitter::new(source);
    for (kind, span) in lexemes {
        emitter.emit(kind, span.start, span.end);
    }
    emitter.finish();
    emitter.drain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokens::Category;

    fn joined(tokens: &[Token<'_>]) -> Vec<u8> {
        tokens.iter().flat_map(|t| t.text.iter().copied()).collect()
    }

    #[test]
    fn test_tree_fills_gaps() {
        let src = b"puts \"hi\"\n";
        let tree = Node::branch(
            NodeKind::Program,
            0..10,
            vec![Node::branch(
                NodeKind::Call,
                0..9,
                vec![
                    Node::leaf(TokenKind::Builtin, 0..4),
                    Node::branch(
                        NodeKind::StringLiteral(Flavor::Double),
                        5..9,
                        vec![
                            Node::leaf(TokenKind::StringBegin(Flavor::Double), 5..6),
                            Node::leaf(TokenKind::StringEnd(Flavor::Double), 8..9),
                        ],
                    ),
                ],
            )],
        );

        let tokens = tokenize_tree(src, &tree);
        assert_eq!(joined(&tokens), src);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Builtin,
                TokenKind::Whitespace,
                TokenKind::StringBegin(Flavor::Double),
                TokenKind::StringContent(Flavor::Double),
                TokenKind::StringEnd(Flavor::Double),
                TokenKind::Whitespace,
            ]
        );
    }

    #[test]
    fn test_children_out_of_order() {
        let src = b"a b";
        let tree = Node::branch(
            NodeKind::Statements,
            0..3,
            vec![
                Node::leaf(TokenKind::Identifier, 2..3),
                Node::leaf(TokenKind::Identifier, 0..1),
            ],
        );
        let tokens = tokenize_tree(src, &tree);
        assert_eq!(joined(&tokens), src);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_other_labels() {
        let src = b"Foo # c";
        let tree = Node::branch(
            NodeKind::Program,
            0..7,
            vec![
                Node::branch(NodeKind::Other("Constant".into()), 0..3, Vec::new()),
                Node::branch(NodeKind::Other("mystery".into()), 4..7, Vec::new()),
            ],
        );
        let tokens = tokenize_tree(src, &tree);
        assert_eq!(tokens[0].kind, TokenKind::Constant);
        assert_eq!(tokens[2].kind, TokenKind::Text);
        assert_eq!(joined(&tokens), src);
    }

    #[test]
    fn test_tree_shorter_than_source() {
        let src = b"  x = 1 junk";
        let tree = Node::branch(
            NodeKind::Program,
            2..7,
            vec![Node::leaf(TokenKind::Identifier, 2..3), Node::leaf(TokenKind::Integer, 6..7)],
        );
        let tokens = tokenize_tree(src, &tree);
        assert_eq!(joined(&tokens), src);
        assert_eq!(tokens.last().map(|t| t.category), Some(Category::Text));
    }

    #[test]
    fn test_lexemes_clamp_overlaps() {
        let src = b"abc def";
        let tokens = tokenize_lexemes(
            src,
            vec![
                (TokenKind::Identifier, 0..3),
                (TokenKind::Identifier, 1..5),
                (TokenKind::Identifier, 5..7),
            ],
        );
        assert_eq!(joined(&tokens), src);
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec![&b"abc"[..], b" d", b"ef"]);
    }

    #[test]
    fn test_lexemes_out_of_range() {
        let src = b"x";
        let tokens = tokenize_lexemes(src, [(TokenKind::Identifier, 0..10)]);
        assert_eq!(joined(&tokens), src);
        assert!(tokenize_lexemes(b"", Vec::new()).is_empty());
    }
}
