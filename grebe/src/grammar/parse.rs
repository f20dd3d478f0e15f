//! # Parse driver
//! A stack machine that feeds a token stream through a compiled
//! [Grammar](crate::grammar::Grammar) and builds the concrete syntax tree.
//! Each stack frame is one nonterminal in progress: the DFA being walked,
//! the current state, and the children collected so far.
//!
//! For every token the driver scans the current state's arcs in order. A
//! terminal arc matches on exact kind (or, for keyword labels, kind NAME plus
//! the exact lexeme) and shifts the token as a leaf. A nonterminal arc
//! matches when the token can begin that nonterminal (its FIRST set has a
//! bit for a label matching the token) and pushes a fresh frame without
//! consuming anything. When no arc matches in an accepting state the frame
//! is popped and its finished node handed to the parent, re-examining the
//! same token there; popping the bottom frame ends the parse. A shift that
//! lands in an accepting state with no outgoing arcs pops right away, so a
//! rule whose last terminal is the last token of the stream (an explicit
//! ENDMARKER, say) still delivers its tree. In an LL(1) grammar at most one
//! arc can match, so scanning in order is deterministic.
//!
//! ```
//! use grebe::grammar::Grammar;
//! use grebe::meta;
//!
//! let tree = meta::parse_source("pair: NAME ':' NAME\n").unwrap();
//! let grammar = Grammar::compile(&tree).unwrap().grammar;
//!
//! let tree = grammar.parse_source("key: value\n").unwrap();
//! assert_eq!(tree.kind(), grammar.symbol_kind("pair").unwrap());
//! assert_eq!(tree.children().len(), 3);
//! ```

use crate::dfa::Dfa;
use crate::grammar::Grammar;
use crate::token::{self, Kind, Token};
use crate::tree::SyntaxTree;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Line {line}: unexpected {found}; expecting one of: {}", .expected.join(", "))]
    UnexpectedToken {
        kind: Kind,
        found: String,
        line: u32,
        expected: Vec<String>,
    },
    #[error("token stream ended before the parse was complete")]
    UnexpectedEnd,
    #[error("the grammar has no rule for the requested start symbol")]
    NoStartRule,
}

/// An in-progress parse. Created by [Grammar::parser]; feed it tokens one at
/// a time and it returns the finished tree once the start rule completes.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    grammar: &'a Grammar,
    stack: Vec<Frame>,
}

#[derive(Debug, Clone)]
struct Frame {
    dfa: usize,
    state: usize,
    kind: Kind,
    children: Vec<SyntaxTree>,
}

enum Action {
    Shift(usize),
    Predict { target: usize, dfa: usize, kind: Kind },
}

impl<'a> Parser<'a> {
    pub(crate) fn new(grammar: &'a Grammar, start: Kind) -> Self {
        let stack = match grammar.dfa_index(start) {
            Some(dfa) => vec![Frame {
                dfa,
                state: grammar.dfas[dfa].start,
                kind: start,
                children: Vec::new(),
            }],
            None => Vec::new(),
        };
        Parser { grammar, stack }
    }

    /// Advances the parse by one token. Returns the finished tree when this
    /// token completed the start rule; the token itself and anything after
    /// it are then not part of the tree.
    pub fn feed(&mut self, token: &Token) -> Result<Option<SyntaxTree>, ParseError> {
        let grammar = self.grammar;
        loop {
            let frame = self.stack.last().ok_or(ParseError::NoStartRule)?;
            let state = &grammar.dfas[frame.dfa].states[frame.state];

            let mut action = None;
            for arc in &state.arcs {
                let label = &grammar.labels.labels[arc.label];
                if token::is_nonterminal(label.kind) {
                    let dfa = match grammar.dfa_index(label.kind) {
                        Some(dfa) => dfa,
                        None => continue,
                    };
                    if first_matches(grammar, &grammar.dfas[dfa], token) {
                        action = Some(Action::Predict {
                            target: arc.target,
                            dfa,
                            kind: label.kind,
                        });
                        break;
                    }
                } else if label.matches(token) {
                    action = Some(Action::Shift(arc.target));
                    break;
                }
            }

            match action {
                Some(Action::Shift(target)) => {
                    let frame = self.stack.last_mut().expect("frame checked above");
                    frame.children.push(SyntaxTree::leaf(token.clone()));
                    frame.state = target;
                    // A frame that lands in an accepting state with no
                    // outgoing arcs can only pop; do it now so a rule whose
                    // last terminal is the last token of the stream (an
                    // explicit ENDMARKER, say) still delivers its tree
                    loop {
                        let frame = self.stack.last().expect("frame checked above");
                        let state = &grammar.dfas[frame.dfa].states[frame.state];
                        if !state.accepting || !state.arcs.is_empty() {
                            return Ok(None);
                        }
                        let frame = self.stack.pop().expect("frame checked above");
                        let node = SyntaxTree::interior(frame.kind, frame.children);
                        match self.stack.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => return Ok(Some(node)),
                        }
                    }
                }
                Some(Action::Predict { target, dfa, kind }) => {
                    let frame = self.stack.last_mut().expect("frame checked above");
                    frame.state = target;
                    let start = grammar.dfas[dfa].start;
                    self.stack.push(Frame {
                        dfa,
                        state: start,
                        kind,
                        children: Vec::new(),
                    });
                    // Loop without consuming: the token starts the sub-rule
                }
                None => {
                    if state.accepting {
                        let frame = self.stack.pop().expect("frame checked above");
                        let node = SyntaxTree::interior(frame.kind, frame.children);
                        match self.stack.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => return Ok(Some(node)),
                        }
                        // Re-examine the same token in the parent frame
                    } else {
                        return Err(self.mismatch(token));
                    }
                }
            }
        }
    }

    fn mismatch(&self, token: &Token) -> ParseError {
        let expected = self
            .stack
            .last()
            .map(|frame| {
                self.grammar.dfas[frame.dfa].states[frame.state]
                    .arcs
                    .iter()
                    .map(|arc| self.grammar.describe_label(arc.label))
                    .collect()
            })
            .unwrap_or_default();
        ParseError::UnexpectedToken {
            kind: token.kind,
            found: token.describe(),
            line: token.line,
            expected,
        }
    }
}

/// Checks whether `token` may begin a derivation of `dfa`: some label in its
/// FIRST set matches the token. FIRST bits index the label table, so keyword
/// labels participate with their lexeme check intact.
fn first_matches(grammar: &Grammar, dfa: &Dfa, token: &Token) -> bool {
    grammar
        .labels
        .labels
        .iter()
        .enumerate()
        .any(|(index, label)| dfa.first_contains(index) && label.matches(token))
}
