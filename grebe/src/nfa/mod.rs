//! # Nondeterministic finite automata
//! One [Nfa] per grammar rule, produced by [build](crate::nfa::build) from
//! the rule's syntax subtree using the usual Thompson-style fragments.
//! Labeled arcs and ε-arcs are stored separately per state: the labeled arcs
//! keep the order in which the grammar mentioned them (which downstream
//! stages rely on for deterministic output), while ε-arcs only ever feed the
//! closure computation, where order is immaterial.
//!
//! [Nfa::to_dfa] converts a rule's NFA into an equivalent minimized
//! [Dfa](crate::dfa::Dfa):
//!
//! 1. **Subset construction**: starting from the ε-closure of the start
//!    state, every reachable set of NFA states becomes one candidate DFA
//!    state, with one arc per label discovered while scanning the member
//!    states in index order. Member sets are bit vectors and two candidate
//!    states are the same exactly when their bit vectors are equal.
//! 2. **State merging**: candidate states with the same accepting flag and
//!    positionally identical arcs are merged, rewriting arcs that pointed at
//!    the deleted state, until a full pass changes nothing.
//! 3. **Emission**: surviving candidates are compacted, in ascending index
//!    order, into the dense [Dfa](crate::dfa::Dfa) representation.
//!
//! A rule whose start closure already contains the accepting state may derive
//! the empty sentence; that is reported as a
//! [Diagnostic::EmptyProduction](crate::grammar::Diagnostic::EmptyProduction)
//! and the parse driver treats the start state as an immediate accept.

use crate::dfa::{Dfa, DfaArc, DfaState};
use crate::grammar::Diagnostic;
use crate::token::Kind;
use bit_vec::BitVec;

pub mod build;

/// The automaton for a single rule, before determinization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) kind: Kind,
    pub(crate) name: String,
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: usize,
    pub(crate) accept: usize,
}

/// An NFA state: labeled arcs in discovery order, plus ε-arc targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) arcs: Vec<NfaArc>,
    pub(crate) epsilon: Vec<usize>,
}

/// A labeled arc: a label-table index and the target state index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaArc {
    pub(crate) label: usize,
    pub(crate) target: usize,
}

/// A candidate DFA state during subset construction: the set of NFA states
/// it stands for, its arcs (pointing at other candidates), the accepting
/// flag, and a tombstone used by the merging pass.
#[derive(Debug, Clone)]
struct TempState {
    members: BitVec,
    arcs: Vec<TempArc>,
    accepting: bool,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct TempArc {
    label: usize,
    target: usize,
    members: BitVec,
}

impl Nfa {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[NfaState] {
        self.states.as_slice()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn accept(&self) -> usize {
        self.accept
    }

    /// Marks `state` and everything reachable from it through ε-arcs alone.
    fn add_closure(&self, marked: &mut BitVec, state: usize) {
        if marked[state] {
            return;
        }
        marked.set(state, true);
        for &target in &self.states[state].epsilon {
            self.add_closure(marked, target);
        }
    }

    /// Converts this NFA into an equivalent minimized DFA via the reduced
    /// powerset construction. Emits an
    /// [EmptyProduction](Diagnostic::EmptyProduction) diagnostic when the
    /// rule may derive the empty sentence.
    pub fn to_dfa(&self, diagnostics: &mut Vec<Diagnostic>) -> Dfa {
        let mut temp: Vec<TempState> = Vec::new();

        let mut members = BitVec::from_elem(self.states.len(), false);
        self.add_closure(&mut members, self.start);
        let accepting = members[self.accept];
        if accepting {
            diagnostics.push(Diagnostic::EmptyProduction(self.name.clone()));
        }
        temp.push(TempState {
            members,
            arcs: Vec::new(),
            accepting,
            deleted: false,
        });

        let mut index = 0;
        while index < temp.len() {
            // Scan the member states in index order; the order in which
            // labels are first seen fixes the arc order of the DFA state
            let members = temp[index].members.clone();
            for component in (0..self.states.len()).filter(|&s| members[s]) {
                for arc in &self.states[component].arcs {
                    let pos = temp[index]
                        .arcs
                        .iter()
                        .position(|t| t.label == arc.label)
                        .unwrap_or_else(|| {
                            temp[index].arcs.push(TempArc {
                                label: arc.label,
                                target: usize::MAX,
                                members: BitVec::from_elem(self.states.len(), false),
                            });
                            temp[index].arcs.len() - 1
                        });
                    self.add_closure(&mut temp[index].arcs[pos].members, arc.target);
                }
            }
            // Resolve each arc's pending member set to a candidate state,
            // appending a fresh one when the set is new
            for pos in 0..temp[index].arcs.len() {
                let pending = temp[index].arcs[pos].members.clone();
                let target = match temp.iter().position(|s| s.members == pending) {
                    Some(existing) => existing,
                    None => {
                        let accepting = pending[self.accept];
                        temp.push(TempState {
                            members: pending,
                            arcs: Vec::new(),
                            accepting,
                            deleted: false,
                        });
                        temp.len() - 1
                    }
                };
                temp[index].arcs[pos].target = target;
            }
            index += 1;
        }

        simplify(&mut temp);
        self.emit(&temp)
    }

    /// Compacts the surviving candidate states, in ascending index order,
    /// into the dense DFA form. Candidate 0 always survives, so the start
    /// state is its compacted index.
    fn emit(&self, temp: &[TempState]) -> Dfa {
        let mut remap = vec![usize::MAX; temp.len()];
        let mut next = 0;
        for (index, state) in temp.iter().enumerate() {
            if !state.deleted {
                remap[index] = next;
                next += 1;
            }
        }
        let states = temp
            .iter()
            .filter(|state| !state.deleted)
            .map(|state| DfaState {
                arcs: state
                    .arcs
                    .iter()
                    .map(|arc| DfaArc {
                        label: arc.label,
                        target: remap[arc.target],
                    })
                    .collect(),
                accepting: state.accepting,
            })
            .collect();
        Dfa {
            kind: self.kind,
            name: self.name.clone(),
            start: remap[0],
            states,
            first: Vec::new(),
        }
    }
}

/// Two candidate states are equivalent when they accept alike and their arcs
/// agree positionally on label and target. Positional comparison is sound
/// because arcs were appended in label discovery order on both sides.
fn same_state(a: &TempState, b: &TempState) -> bool {
    a.accepting == b.accepting
        && a.arcs.len() == b.arcs.len()
        && a.arcs
            .iter()
            .zip(&b.arcs)
            .all(|(x, y)| x.label == y.label && x.target == y.target)
}

/// Merges equivalent candidate states until a full pass makes no change.
/// The iteration to a fixed point is what lets the pairwise comparison get
/// away with comparing raw targets: each merge rewrites targets, which can
/// expose further pairs on the next pass.
fn simplify(temp: &mut Vec<TempState>) {
    let mut changed = true;
    while changed {
        changed = false;
        for i in 1..temp.len() {
            if temp[i].deleted {
                continue;
            }
            for j in 0..i {
                if temp[j].deleted {
                    continue;
                }
                if same_state(&temp[i], &temp[j]) {
                    temp[i].deleted = true;
                    for k in 0..temp.len() {
                        if temp[k].deleted {
                            continue;
                        }
                        for arc in &mut temp[k].arcs {
                            if arc.target == i {
                                arc.target = j;
                            }
                        }
                    }
                    changed = true;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfa(states: Vec<NfaState>, start: usize, accept: usize) -> Nfa {
        Nfa {
            kind: crate::token::NT_OFFSET,
            name: "t".to_string(),
            states,
            start,
            accept,
        }
    }

    fn state(arcs: Vec<(usize, usize)>, epsilon: Vec<usize>) -> NfaState {
        NfaState {
            arcs: arcs
                .into_iter()
                .map(|(label, target)| NfaArc { label, target })
                .collect(),
            epsilon,
        }
    }

    #[test]
    fn closure_follows_epsilon_cycles() {
        // 0 -ε-> 1 -ε-> 2 -ε-> 0, plus 3 unreachable
        let n = nfa(
            vec![
                state(vec![], vec![1]),
                state(vec![], vec![2]),
                state(vec![], vec![0]),
                state(vec![], vec![]),
            ],
            0,
            2,
        );
        let mut marked = BitVec::from_elem(4, false);
        n.add_closure(&mut marked, 0);
        assert_eq!(
            marked.iter().collect::<Vec<_>>(),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn subset_merges_equal_member_sets() {
        // Two alternatives over the same label, ending in distinct accepting
        // states, collapse to a two-state DFA
        let n = nfa(
            vec![
                state(vec![(1, 1)], vec![]),       // 0: 'a' -> 1
                state(vec![], vec![5]),            // 1
                state(vec![(2, 3)], vec![]),       // 2: 'b' -> 3
                state(vec![], vec![5]),            // 3
                state(vec![], vec![0, 2]),         // 4: fork
                state(vec![], vec![]),             // 5: accept
            ],
            4,
            5,
        );
        let mut diagnostics = Vec::new();
        let dfa = n.to_dfa(&mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(dfa.states().len(), 2);
        let start = &dfa.states()[dfa.start()];
        assert!(!start.is_accepting());
        assert_eq!(
            start
                .arcs()
                .iter()
                .map(|a| (a.label(), a.target()))
                .collect::<Vec<_>>(),
            vec![(1, 1), (2, 1)]
        );
        assert!(dfa.states()[1].is_accepting());
    }

    #[test]
    fn empty_derivation_is_diagnosed_once() {
        // 0 -ε-> 1(accept), 0 -'a'-> 1: the optional shape
        let n = nfa(vec![state(vec![(1, 1)], vec![1]), state(vec![], vec![])], 0, 1);
        let mut diagnostics = Vec::new();
        let dfa = n.to_dfa(&mut diagnostics);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::EmptyProduction("t".to_string())]
        );
        assert!(dfa.states()[dfa.start()].is_accepting());
        assert_eq!(dfa.states().len(), 2);
    }

    #[test]
    fn kleene_star_self_loop() {
        // 0 -'a'-> 1, 1 -ε-> 0, start 0 accept 0: zero or more 'a'
        let n = nfa(vec![state(vec![(1, 1)], vec![]), state(vec![], vec![0])], 0, 0);
        let mut diagnostics = Vec::new();
        let dfa = n.to_dfa(&mut diagnostics);
        // start accepts (empty) and loops on 'a' into an accepting state
        assert!(dfa.states()[dfa.start()].is_accepting());
        let looped = dfa.states()[dfa.start()].arcs()[0].target();
        assert!(dfa.states()[looped].is_accepting());
        assert_eq!(dfa.states()[looped].arcs()[0].target(), looped);
    }
}
