//! # grebe
//!
//! `grebe` is an LL(1) parser generator: it compiles grammars written in a
//! small EBNF-like meta-language into table-driven parsers, and drives token
//! streams through them to produce concrete syntax trees.
//!
//! ## Usage
//!
//! ```rust
//! use grebe::grammar::Grammar;
//! use grebe::meta;
//!
//! fn main() {
//!     let source = "
//! expr:   term (('+' | '-') term)*
//! term:   factor (('*' | '/') factor)*
//! factor: NAME | NUMBER | '(' expr ')'
//! ";
//!     // First pass: the front end parses the grammar description itself
//!     let tree = meta::parse_source(source).unwrap();
//!     // Second pass: compile it down to one minimized DFA per rule,
//!     // collecting any diagnostics (left recursion, untranslatable
//!     // labels, rules that may derive the empty sentence)
//!     let compilation = Grammar::compile(&tree).unwrap();
//!     assert!(compilation.diagnostics.is_empty());
//!
//!     // The compiled grammar parses matching inputs into syntax trees
//!     let grammar = compilation.grammar;
//!     let parsed = grammar.parse_source("a + 2 * (b - 1)\n").unwrap();
//!     assert_eq!(parsed.kind(), grammar.symbol_kind("expr").unwrap());
//!
//!     // ...and rejects the rest with a positioned error
//!     assert!(grammar.parse_source("a + + b\n").is_err());
//! }
//! ```
//!
//! ## The grammar language
//!
//! A grammar is a sequence of rules, one per line:
//!
//! ```text
//! rule_name: alternatives
//! ```
//!
//! An alternative is a sequence of items separated by `|` from the next
//! alternative. Each item is an atom, an atom with a `*` (zero or more) or
//! `+` (one or more) suffix, or a bracketed `[optional part]`. Atoms are
//! token-kind names (`NAME`, `NUMBER`, `STRING`, `NEWLINE`, ...), references
//! to other rules, quoted keywords (`'if'`) or quoted operator spellings
//! (`':'`, `'->'`), and parenthesized groups. `#` starts a comment; rules
//! may span lines inside parentheses or brackets.
//!
//! The first rule is the start symbol unless
//! [Options::start](grammar::Options) says otherwise.
//!
//! ## Pipeline
//!
//! Compilation is four stages, run strictly in order per grammar:
//!
//! 1. [NFA construction](nfa::build) from the front end's syntax tree, one
//!    automaton per rule, with all symbolic references interned in a shared
//!    [label table](labels::LabelTable),
//! 2. [subset construction and state merging](nfa::Nfa::to_dfa) into one
//!    minimized [Dfa](dfa::Dfa) per rule,
//! 3. label translation, resolving each label to a terminal kind, keyword
//!    or nonterminal index, and
//! 4. [FIRST-set computation](grammar) for predictive parsing, with left
//!    recursion detected and reported.
//!
//! The [parse driver](grammar::parse) is a stack machine over the compiled
//! tables; see its module docs for the matching rules.
//!
//! ## Operations
//!
//! This library currently supports:
//!
//! * [Tokenizing](lexer::tokenize) grammar sources and parser inputs
//! * [Parsing grammar descriptions](meta::parse_source) into syntax trees
//! * [Compiling](grammar::Grammar::compile) a grammar tree into DFA tables
//! * [Parsing token streams](grammar::Grammar::parse) and
//!   [source strings](grammar::Grammar::parse_source) with a compiled
//!   grammar
//! * Incremental, token-at-a-time parsing via
//!   [Parser::feed](grammar::parse::Parser::feed)
//! * [Rendering](grammar::Grammar::render) syntax trees with rule names
//!   resolved
//! * Self-hosting: the meta-grammar, compiled, parses its own description
//!   into the same tree the front end produces

pub mod dfa;
pub mod grammar;
pub mod labels;
pub mod lexer;
pub mod meta;
pub mod nfa;
pub mod token;
pub mod tree;
