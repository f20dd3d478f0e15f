//! # Syntax trees
//! The rose tree produced both by the [meta-grammar front end](crate::meta)
//! and by the [parse driver](crate::grammar::parse). Interior nodes carry the
//! nonterminal kind they were derived from; leaves carry the tokens exactly
//! as the tokenizer produced them. Sharing one shape between the two
//! producers is what lets a grammar's own parser be checked against the front
//! end by plain equality.

use crate::token::{self, Kind, Token};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxTree {
    Interior { kind: Kind, children: Vec<SyntaxTree> },
    Leaf(Token),
}

impl SyntaxTree {
    pub fn interior(kind: Kind, children: Vec<SyntaxTree>) -> Self {
        SyntaxTree::Interior { kind, children }
    }

    pub fn leaf(token: Token) -> Self {
        SyntaxTree::Leaf(token)
    }

    /// The node's kind: the nonterminal kind of an interior node, the token
    /// kind of a leaf.
    pub fn kind(&self) -> Kind {
        match self {
            SyntaxTree::Interior { kind, .. } => *kind,
            SyntaxTree::Leaf(token) => token.kind,
        }
    }

    /// The node's children; empty for leaves.
    pub fn children(&self) -> &[SyntaxTree] {
        match self {
            SyntaxTree::Interior { children, .. } => children,
            SyntaxTree::Leaf(_) => &[],
        }
    }

    /// The leaf's token, if this is a leaf.
    pub fn token(&self) -> Option<&Token> {
        match self {
            SyntaxTree::Interior { .. } => None,
            SyntaxTree::Leaf(token) => Some(token),
        }
    }

    pub(crate) fn write_indented(
        &self,
        f: &mut fmt::Formatter<'_>,
        depth: usize,
        symbol_name: &dyn Fn(Kind) -> Option<String>,
    ) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        match self {
            SyntaxTree::Interior { kind, children } => {
                match symbol_name(*kind) {
                    Some(name) => writeln!(f, "{name}")?,
                    None => writeln!(f, "<{kind}>")?,
                }
                for child in children {
                    child.write_indented(f, depth + 1, symbol_name)?;
                }
                Ok(())
            }
            SyntaxTree::Leaf(tok) => {
                let kind = token::name(tok.kind).unwrap_or("<unknown token>");
                if tok.text.is_empty() {
                    writeln!(f, "{kind}")
                } else {
                    writeln!(f, "{kind} {:?}", tok.text)
                }
            }
        }
    }
}

/// Renders the tree one node per line, children indented below their parent.
/// Nonterminal kinds print numerically; [Grammar::render](crate::grammar::Grammar::render)
/// resolves them to rule names.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0, &|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let leaf = SyntaxTree::leaf(Token::new(token::NAME, "x", 1));
        let node = SyntaxTree::interior(token::NT_OFFSET, vec![leaf.clone()]);
        assert_eq!(node.kind(), token::NT_OFFSET);
        assert_eq!(node.children(), &[leaf.clone()]);
        assert_eq!(leaf.token().unwrap().text, "x");
        assert!(node.token().is_none());
    }

    #[test]
    fn display_is_indented() {
        let tree = SyntaxTree::interior(
            token::NT_OFFSET,
            vec![
                SyntaxTree::leaf(Token::new(token::NAME, "x", 1)),
                SyntaxTree::leaf(Token::new(token::NEWLINE, "", 1)),
            ],
        );
        assert_eq!(tree.to_string(), "<256>\n  NAME \"x\"\n  NEWLINE\n");
    }
}
