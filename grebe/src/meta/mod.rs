//! # Meta-grammar front end
//! A recursive descent parser for the grammar description language itself:
//!
//! ```text
//! mstart: (rule | NEWLINE)* ENDMARKER
//! rule:   NAME ':' rhs NEWLINE
//! rhs:    alt ('|' alt)*
//! alt:    item+
//! item:   '[' rhs ']' | atom ('*' | '+')?
//! atom:   '(' rhs ')' | NAME | STRING
//! ```
//!
//! The output is a [SyntaxTree] whose interior kinds are the [MSTART]..[ATOM]
//! constants below and whose leaves keep every token, punctuation included.
//! The [NFA builder](crate::grammar::Grammar::compile) consumes exactly this
//! shape.
//!
//! ```
//! use grebe::meta;
//!
//! let tree = meta::parse_source("greeting: 'hello' NAME NEWLINE\n").unwrap();
//! assert_eq!(tree.kind(), meta::MSTART);
//! // one rule plus the ENDMARKER leaf
//! assert_eq!(tree.children().len(), 2);
//! assert_eq!(tree.children()[0].kind(), meta::RULE);
//! ```

use crate::lexer::{self, LexError};
use crate::token::{self, Kind, Token};
use crate::tree::SyntaxTree;
use std::iter::Peekable;
use std::vec;
use thiserror::Error;

/// Nonterminal kinds of the meta-grammar, in declaration order. They line up
/// with the kinds a compiled meta-grammar assigns to its own rules, which is
/// what makes self-hosting an equality check.
pub const MSTART: Kind = token::NT_OFFSET;
pub const RULE: Kind = token::NT_OFFSET + 1;
pub const RHS: Kind = token::NT_OFFSET + 2;
pub const ALT: Kind = token::NT_OFFSET + 3;
pub const ITEM: Kind = token::NT_OFFSET + 4;
pub const ATOM: Kind = token::NT_OFFSET + 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Line {line}: expecting {expected}, got {found}")]
pub struct SyntaxError {
    pub line: u32,
    pub expected: &'static str,
    pub found: String,
}

#[derive(Debug, Error)]
pub enum MetaError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Tokenizes and parses a grammar source.
pub fn parse_source(source: &str) -> Result<SyntaxTree, MetaError> {
    Ok(parse(lexer::tokenize(source)?)?)
}

/// Parses an ENDMARKER-terminated token stream into a meta-grammar tree.
pub fn parse(tokens: Vec<Token>) -> Result<SyntaxTree, SyntaxError> {
    MetaParser {
        tokens: tokens.into_iter().peekable(),
    }
    .mstart()
}

struct MetaParser {
    tokens: Peekable<vec::IntoIter<Token>>,
}

impl MetaParser {
    fn bump(&mut self) -> Token {
        self.tokens
            .next()
            .unwrap_or_else(|| Token::new(token::ENDMARKER, "", 0))
    }

    fn peek_kind(&mut self) -> Kind {
        self.tokens.peek().map_or(token::ENDMARKER, |t| t.kind)
    }

    fn expect(&mut self, kind: Kind) -> Result<SyntaxTree, SyntaxError> {
        let tok = self.bump();
        if tok.kind == kind {
            Ok(SyntaxTree::leaf(tok))
        } else {
            Err(SyntaxError {
                line: tok.line,
                expected: token::name(kind).unwrap_or("<unknown token>"),
                found: tok.describe(),
            })
        }
    }

    /// mstart: (rule | NEWLINE)* ENDMARKER
    fn mstart(&mut self) -> Result<SyntaxTree, SyntaxError> {
        let mut children = Vec::new();
        loop {
            match self.peek_kind() {
                token::ENDMARKER => {
                    children.push(SyntaxTree::leaf(self.bump()));
                    break;
                }
                token::NEWLINE => children.push(SyntaxTree::leaf(self.bump())),
                _ => children.push(self.rule()?),
            }
        }
        Ok(SyntaxTree::interior(MSTART, children))
    }

    /// rule: NAME ':' rhs NEWLINE
    fn rule(&mut self) -> Result<SyntaxTree, SyntaxError> {
        let children = vec![
            self.expect(token::NAME)?,
            self.expect(token::COLON)?,
            self.rhs()?,
            self.expect(token::NEWLINE)?,
        ];
        Ok(SyntaxTree::interior(RULE, children))
    }

    /// rhs: alt ('|' alt)*
    fn rhs(&mut self) -> Result<SyntaxTree, SyntaxError> {
        let mut children = vec![self.alt()?];
        while self.peek_kind() == token::VBAR {
            children.push(SyntaxTree::leaf(self.bump()));
            children.push(self.alt()?);
        }
        Ok(SyntaxTree::interior(RHS, children))
    }

    /// alt: item+
    fn alt(&mut self) -> Result<SyntaxTree, SyntaxError> {
        let mut children = vec![self.item()?];
        while matches!(
            self.peek_kind(),
            token::LSQB | token::LPAR | token::NAME | token::STRING
        ) {
            children.push(self.item()?);
        }
        Ok(SyntaxTree::interior(ALT, children))
    }

    /// item: '[' rhs ']' | atom ('*' | '+')?
    fn item(&mut self) -> Result<SyntaxTree, SyntaxError> {
        let mut children = Vec::new();
        if self.peek_kind() == token::LSQB {
            children.push(SyntaxTree::leaf(self.bump()));
            children.push(self.rhs()?);
            children.push(self.expect(token::RSQB)?);
        } else {
            children.push(self.atom()?);
            if matches!(self.peek_kind(), token::STAR | token::PLUS) {
                children.push(SyntaxTree::leaf(self.bump()));
            }
        }
        Ok(SyntaxTree::interior(ITEM, children))
    }

    /// atom: '(' rhs ')' | NAME | STRING
    fn atom(&mut self) -> Result<SyntaxTree, SyntaxError> {
        let children = match self.peek_kind() {
            token::LPAR => vec![
                SyntaxTree::leaf(self.bump()),
                self.rhs()?,
                self.expect(token::RPAR)?,
            ],
            token::STRING => vec![SyntaxTree::leaf(self.bump())],
            _ => vec![self.expect(token::NAME)?],
        };
        Ok(SyntaxTree::interior(ATOM, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rule_shape() {
        let tree = parse_source("s: 'x'\n").unwrap();
        assert_eq!(tree.kind(), MSTART);
        let rule = &tree.children()[0];
        assert_eq!(rule.kind(), RULE);
        let kinds: Vec<_> = rule.children().iter().map(SyntaxTree::kind).collect();
        assert_eq!(kinds, vec![token::NAME, token::COLON, RHS, token::NEWLINE]);
        let rhs = &rule.children()[2];
        assert_eq!(rhs.children().len(), 1);
        let alt = &rhs.children()[0];
        assert_eq!(alt.kind(), ALT);
        let item = &alt.children()[0];
        assert_eq!(item.kind(), ITEM);
        let atom = &item.children()[0];
        assert_eq!(atom.kind(), ATOM);
        assert_eq!(atom.children()[0].token().unwrap().text, "'x'");
    }

    #[test]
    fn alternation_keeps_separators() {
        let tree = parse_source("s: 'a' | 'b' | 'c'\n").unwrap();
        let rhs = &tree.children()[0].children()[2];
        let kinds: Vec<_> = rhs.children().iter().map(SyntaxTree::kind).collect();
        assert_eq!(kinds, vec![ALT, token::VBAR, ALT, token::VBAR, ALT]);
    }

    #[test]
    fn suffixes_and_brackets() {
        let tree = parse_source("s: a* [b] c+\n").unwrap();
        let alt = &tree.children()[0].children()[2].children()[0];
        assert_eq!(alt.children().len(), 3);
        let starred = &alt.children()[0];
        assert_eq!(starred.children().len(), 2);
        assert_eq!(starred.children()[1].kind(), token::STAR);
        let optional = &alt.children()[1];
        let kinds: Vec<_> = optional.children().iter().map(SyntaxTree::kind).collect();
        assert_eq!(kinds, vec![token::LSQB, RHS, token::RSQB]);
        let plussed = &alt.children()[2];
        assert_eq!(plussed.children()[1].kind(), token::PLUS);
    }

    #[test]
    fn reports_expected_token() {
        let err = match parse_source("s 'x'\n") {
            Err(MetaError::Syntax(err)) => err,
            other => panic!("expected a syntax error, got {other:?}"),
        };
        assert_eq!(err.line, 1);
        assert_eq!(err.expected, "COLON");
        assert_eq!(err.found, "\"'x'\"");
    }

    #[test]
    fn missing_rule_name() {
        let err = match parse_source(": 'x'\n") {
            Err(MetaError::Syntax(err)) => err,
            other => panic!("expected a syntax error, got {other:?}"),
        };
        assert_eq!(err.expected, "NAME");
    }
}
