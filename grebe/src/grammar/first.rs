//! FIRST sets.
//!
//! For every nonterminal, the set of label positions whose terminals may
//! begin one of its derivations. The driver consults these bitsets to decide
//! whether to predict into a sub-DFA, so a bit position is a label-table
//! index, never a raw token kind.
//!
//! Computation is the usual mutually recursive walk over the start-state
//! arcs of each DFA, with a three-way slot per nonterminal to tell "not yet
//! started" from "on the current recursion path" from "finished". Meeting an
//! in-progress slot means the grammar is left-recursive there; the affected
//! nonterminal is reported and its FIRST set is left empty, which makes
//! every later prediction into it fail rather than loop.

use crate::dfa::Dfa;
use crate::grammar::Diagnostic;
use crate::labels::LabelTable;
use crate::token;
use bit_vec::BitVec;

#[derive(Debug, Clone)]
enum Slot {
    Unset,
    InProgress,
    Done(BitVec),
}

/// Computes and stores the FIRST set of every DFA, serialized little-endian
/// into `labels.len() / 8 + 1` bytes.
pub(crate) fn compute(dfas: &mut [Dfa], labels: &LabelTable, diagnostics: &mut Vec<Diagnostic>) {
    let mut slots = vec![Slot::Unset; dfas.len()];
    for index in 0..dfas.len() {
        if matches!(slots[index], Slot::Unset) {
            calc(index, dfas, labels, &mut slots, diagnostics);
        }
    }
    for (dfa, slot) in dfas.iter_mut().zip(&slots) {
        let empty = BitVec::from_elem(labels.len(), false);
        let bits = match slot {
            Slot::Done(bits) => bits,
            // calc always finishes every slot it touches
            _ => &empty,
        };
        dfa.first = serialize(bits, labels.len());
    }
}

fn calc(
    index: usize,
    dfas: &[Dfa],
    labels: &LabelTable,
    slots: &mut Vec<Slot>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    slots[index] = Slot::InProgress;
    let mut bits = BitVec::from_elem(labels.len(), false);
    let mut recursive = false;
    let mut seen: Vec<usize> = Vec::new();

    let dfa = &dfas[index];
    let start = &dfa.states[dfa.start];
    for arc in &start.arcs {
        if seen.contains(&arc.label) {
            continue;
        }
        seen.push(arc.label);
        let kind = match labels.get(arc.label) {
            Some(label) => label.kind,
            None => continue,
        };
        if token::is_nonterminal(kind) {
            let callee = (kind - token::NT_OFFSET) as usize;
            if callee >= dfas.len() {
                continue;
            }
            match &slots[callee] {
                Slot::InProgress => {
                    diagnostics.push(Diagnostic::LeftRecursion(dfas[callee].name.clone()));
                    recursive = true;
                }
                Slot::Done(callee_bits) => {
                    bits.union(callee_bits);
                }
                Slot::Unset => {
                    calc(callee, dfas, labels, slots, diagnostics);
                    if let Slot::Done(callee_bits) = &slots[callee] {
                        bits.union(callee_bits);
                    }
                }
            }
        } else {
            bits.set(arc.label, true);
        }
    }

    slots[index] = Slot::Done(if recursive {
        BitVec::from_elem(labels.len(), false)
    } else {
        bits
    });
}

fn serialize(bits: &BitVec, label_count: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; label_count / 8 + 1];
    for (index, set) in bits.iter().enumerate() {
        if set {
            bytes[index / 8] |= 1 << (index % 8);
        }
    }
    bytes
}
