//! Builds one NFA per rule from a meta-grammar syntax tree, interning labels
//! into the shared table as the grammar mentions them. Nonterminal kinds are
//! handed out in rule declaration order starting at
//! [NT_OFFSET](crate::token::NT_OFFSET), so a rule's kind doubles as its
//! index into the DFA list later on.
//!
//! The tree walk mirrors the meta-grammar exactly; a tree that deviates from
//! the RULE/RHS/ALT/ITEM/ATOM shapes is a fatal [TreeError] carrying a
//! description of the offending node.

use crate::labels::LabelTable;
use crate::meta;
use crate::nfa::{Nfa, NfaArc, NfaState};
use crate::token::{self, Kind, Token};
use crate::tree::SyntaxTree;
use thiserror::Error;

/// The shape of the input tree did not match the meta-grammar. Fatal: no
/// automaton can be built from a malformed tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed grammar syntax tree: {0}")]
pub struct TreeError(pub String);

/// The NFAs of all rules plus the label table they share.
#[derive(Debug)]
pub(crate) struct NfaSet {
    pub(crate) nfas: Vec<Nfa>,
    pub(crate) labels: LabelTable,
}

/// Walks an MSTART tree and builds the NFA of every rule it contains.
pub(crate) fn build(tree: &SyntaxTree) -> Result<NfaSet, TreeError> {
    let mut builder = Builder {
        labels: LabelTable::new(),
        next_kind: token::NT_OFFSET,
    };
    expect_interior(tree, meta::MSTART, "grammar start")?;
    let mut nfas = Vec::new();
    for child in tree.children() {
        match child {
            SyntaxTree::Interior { kind, .. } if *kind == meta::RULE => {
                nfas.push(builder.rule(child)?);
            }
            SyntaxTree::Leaf(tok)
                if tok.kind == token::NEWLINE || tok.kind == token::ENDMARKER => {}
            other => {
                return Err(TreeError(format!(
                    "expected a rule at the top level, found {}",
                    describe(other)
                )))
            }
        }
    }
    Ok(NfaSet {
        nfas,
        labels: builder.labels,
    })
}

struct Builder {
    labels: LabelTable,
    next_kind: Kind,
}

/// The states of the rule currently being built. Construction helpers return
/// `(start, accept)` pairs of state indices into this vector.
#[derive(Default)]
struct RuleStates {
    states: Vec<NfaState>,
}

impl RuleStates {
    fn state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn arc(&mut self, from: usize, label: usize, to: usize) {
        self.states[from].arcs.push(NfaArc { label, target: to });
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.push(to);
    }
}

impl Builder {
    /// rule: NAME ':' rhs NEWLINE
    fn rule(&mut self, node: &SyntaxTree) -> Result<Nfa, TreeError> {
        let [name, colon, rhs, newline] = expect_children(node, "rule")?;
        let name = expect_leaf(name, token::NAME, "rule name")?;
        expect_leaf(colon, token::COLON, "rule separator")?;
        let kind = self.next_kind;
        self.next_kind += 1;
        // Rules register their own name even when nothing refers to it yet
        self.labels.intern(token::NAME, &name.text);
        let mut states = RuleStates::default();
        let (start, accept) = self.rhs(&mut states, rhs)?;
        expect_leaf(newline, token::NEWLINE, "rule terminator")?;
        Ok(Nfa {
            kind,
            name: name.text.clone(),
            states: states.states,
            start,
            accept,
        })
    }

    /// rhs: alt ('|' alt)*. A single alternative passes through unchanged;
    /// several get fresh start/accept states with ε-arcs fanning out and in.
    fn rhs(&mut self, states: &mut RuleStates, node: &SyntaxTree) -> Result<(usize, usize), TreeError> {
        expect_interior(node, meta::RHS, "rule right-hand side")?;
        let children = node.children();
        let first = children
            .first()
            .ok_or_else(|| TreeError("right-hand side has no alternatives".to_string()))?;
        let (alt_start, alt_accept) = self.alt(states, first)?;
        if children.len() == 1 {
            return Ok((alt_start, alt_accept));
        }
        let start = states.state();
        let accept = states.state();
        states.epsilon(start, alt_start);
        states.epsilon(alt_accept, accept);
        for child in &children[1..] {
            match child {
                SyntaxTree::Interior { kind, .. } if *kind == meta::ALT => {
                    let (alt_start, alt_accept) = self.alt(states, child)?;
                    states.epsilon(start, alt_start);
                    states.epsilon(alt_accept, accept);
                }
                SyntaxTree::Leaf(tok) if tok.kind == token::VBAR => {}
                other => {
                    return Err(TreeError(format!(
                        "expected an alternative, found {}",
                        describe(other)
                    )))
                }
            }
        }
        Ok((start, accept))
    }

    /// alt: item+, concatenated left to right with ε-arcs.
    fn alt(&mut self, states: &mut RuleStates, node: &SyntaxTree) -> Result<(usize, usize), TreeError> {
        expect_interior(node, meta::ALT, "alternative")?;
        let children = node.children();
        let first = children
            .first()
            .ok_or_else(|| TreeError("alternative has no items".to_string()))?;
        let (start, mut accept) = self.item(states, first)?;
        for child in &children[1..] {
            let (item_start, item_accept) = self.item(states, child)?;
            states.epsilon(accept, item_start);
            accept = item_accept;
        }
        Ok((start, accept))
    }

    /// item: '[' rhs ']' | atom ('*' | '+')?
    fn item(&mut self, states: &mut RuleStates, node: &SyntaxTree) -> Result<(usize, usize), TreeError> {
        expect_interior(node, meta::ITEM, "item")?;
        let children = node.children();
        match children.first() {
            Some(atom @ SyntaxTree::Interior { kind, .. }) if *kind == meta::ATOM => {
                let (start, accept) = self.atom(states, atom)?;
                match children.get(1) {
                    None => Ok((start, accept)),
                    Some(SyntaxTree::Leaf(tok)) if tok.kind == token::STAR => {
                        states.epsilon(accept, start);
                        // Zero or more: looping back through start also skips
                        Ok((start, start))
                    }
                    Some(SyntaxTree::Leaf(tok)) if tok.kind == token::PLUS => {
                        states.epsilon(accept, start);
                        Ok((start, accept))
                    }
                    Some(other) => Err(TreeError(format!(
                        "expected a repetition suffix, found {}",
                        describe(other)
                    ))),
                }
            }
            Some(SyntaxTree::Leaf(tok)) if tok.kind == token::LSQB => {
                let start = states.state();
                let accept = states.state();
                states.epsilon(start, accept);
                let rhs = children.get(1).ok_or_else(|| {
                    TreeError("bracketed item is missing its contents".to_string())
                })?;
                let (rhs_start, rhs_accept) = self.rhs(states, rhs)?;
                states.epsilon(start, rhs_start);
                states.epsilon(rhs_accept, accept);
                match children.get(2) {
                    Some(SyntaxTree::Leaf(tok)) if tok.kind == token::RSQB && children.len() == 3 => {
                        Ok((start, accept))
                    }
                    _ => Err(TreeError(format!(
                        "bracketed item is not closed in {}",
                        describe(node)
                    ))),
                }
            }
            Some(other) => Err(TreeError(format!(
                "expected an atom or '[', found {}",
                describe(other)
            ))),
            None => Err(TreeError("item node has no children".to_string())),
        }
    }

    /// atom: '(' rhs ')' | NAME | STRING
    fn atom(&mut self, states: &mut RuleStates, node: &SyntaxTree) -> Result<(usize, usize), TreeError> {
        expect_interior(node, meta::ATOM, "atom")?;
        let children = node.children();
        let head = children
            .first()
            .and_then(SyntaxTree::token)
            .ok_or_else(|| TreeError(format!("atom without a leading token in {}", describe(node))))?;
        match head.kind {
            token::LPAR => {
                let rhs = children.get(1).ok_or_else(|| {
                    TreeError("parenthesized atom is missing its contents".to_string())
                })?;
                let pair = self.rhs(states, rhs)?;
                match children.get(2) {
                    Some(SyntaxTree::Leaf(tok)) if tok.kind == token::RPAR && children.len() == 3 => {
                        Ok(pair)
                    }
                    _ => Err(TreeError(format!(
                        "parenthesized atom is not closed in {}",
                        describe(node)
                    ))),
                }
            }
            token::NAME | token::STRING => {
                let start = states.state();
                let accept = states.state();
                let label = self.labels.intern(head.kind, &head.text);
                states.arc(start, label, accept);
                Ok((start, accept))
            }
            _ => Err(TreeError(format!(
                "expected a name, string or '(', found {}",
                describe(&children[0])
            ))),
        }
    }
}

fn expect_interior(node: &SyntaxTree, kind: Kind, what: &str) -> Result<(), TreeError> {
    match node {
        SyntaxTree::Interior { kind: found, .. } if *found == kind => Ok(()),
        other => Err(TreeError(format!(
            "expected {what}, found {}",
            describe(other)
        ))),
    }
}

fn expect_children<'a, const N: usize>(
    node: &'a SyntaxTree,
    what: &str,
) -> Result<[&'a SyntaxTree; N], TreeError> {
    let children = node.children();
    if children.len() == N {
        let mut iter = children.iter();
        Ok(std::array::from_fn(|_| {
            iter.next().expect("length checked above")
        }))
    } else {
        Err(TreeError(format!(
            "{what} node has {} children, expected {N}",
            children.len()
        )))
    }
}

fn expect_leaf<'a>(node: &'a SyntaxTree, kind: Kind, what: &str) -> Result<&'a Token, TreeError> {
    match node.token() {
        Some(tok) if tok.kind == kind => Ok(tok),
        _ => Err(TreeError(format!(
            "expected {what}, found {}",
            describe(node)
        ))),
    }
}

fn describe(node: &SyntaxTree) -> String {
    match node {
        SyntaxTree::Interior { kind, children } => {
            format!("interior node <{kind}> with {} children", children.len())
        }
        SyntaxTree::Leaf(tok) => format!("token {}", tok.describe()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    fn build_source(source: &str) -> NfaSet {
        build(&meta::parse_source(source).unwrap()).unwrap()
    }

    #[test]
    fn kinds_follow_declaration_order() {
        let set = build_source("a: 'x'\nb: 'y'\nc: a b\n");
        let kinds: Vec<_> = set.nfas.iter().map(Nfa::kind).collect();
        assert_eq!(
            kinds,
            vec![token::NT_OFFSET, token::NT_OFFSET + 1, token::NT_OFFSET + 2]
        );
        let names: Vec<_> = set.nfas.iter().map(|n| n.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn labels_are_interned_once() {
        let set = build_source("a: 'x' 'x'\nb: 'x'\n");
        // EMPTY, rule name a, 'x', rule name b
        assert_eq!(set.labels.len(), 4);
        assert_eq!(set.labels.get(2).unwrap().text(), Some("'x'"));
    }

    #[test]
    fn atom_emits_two_states_and_one_arc() {
        let set = build_source("a: 'x'\n");
        let nfa = &set.nfas[0];
        assert_eq!(nfa.states().len(), 2);
        assert_eq!(nfa.states()[nfa.start()].arcs.len(), 1);
        assert_eq!(nfa.states()[nfa.start()].arcs[0].target, nfa.accept());
    }

    #[test]
    fn star_loops_back_to_start() {
        let set = build_source("a: 'x'*\n");
        let nfa = &set.nfas[0];
        // accept is the same state as start: zero repetitions accepted
        assert_eq!(nfa.start(), nfa.accept());
        // and the atom's accept state loops back
        assert!(nfa.states().iter().any(|s| s.epsilon.contains(&nfa.start())));
    }

    #[test]
    fn malformed_tree_is_fatal() {
        use crate::tree::SyntaxTree;
        let bogus = SyntaxTree::interior(
            meta::MSTART,
            vec![SyntaxTree::interior(meta::ALT, vec![])],
        );
        let err = build(&bogus).unwrap_err();
        assert!(err.0.contains("expected a rule"));
    }
}
