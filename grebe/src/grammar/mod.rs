//! # Grammar compilation
//! Turns a meta-grammar [SyntaxTree] into a [Grammar]: the table-driven form
//! a [Parser](crate::grammar::parse::Parser) executes. Compilation runs four
//! strictly ordered stages, each one consuming the previous stage's output
//! and never mutating it afterwards:
//!
//! 1. [NFA building](crate::nfa::build): one NFA per rule, labels interned
//!    into the shared table in discovery order.
//! 2. [Subset construction and state merging](crate::nfa::Nfa::to_dfa): one
//!    minimized DFA per rule.
//! 3. **Label translation**: every label is rewritten into its executable
//!    form, either a nonterminal kind when a rule of that name exists, a
//!    terminal kind for known token names and operator spellings, or a
//!    keyword for quoted identifiers.
//! 4. [FIRST sets](crate::grammar::first): the prediction bitsets the
//!    driver uses to choose between nonterminal arcs.
//!
//! Structural problems (a malformed tree) abort compilation with a
//! [TreeError]; everything else is a [Diagnostic] collected into the
//! [Compilation] so a caller can decide how loud to be about them.
//!
//! ```
//! use grebe::grammar::Grammar;
//! use grebe::meta;
//!
//! let tree = meta::parse_source("expr: NAME ('+' NAME)*\n").unwrap();
//! let compilation = Grammar::compile(&tree).unwrap();
//! assert!(compilation.diagnostics.is_empty());
//!
//! let grammar = compilation.grammar;
//! let parsed = grammar.parse_source("a + b + c\n").unwrap();
//! assert_eq!(parsed.kind(), grammar.start());
//! assert_eq!(parsed.children().len(), 5);
//! ```

use crate::dfa::Dfa;
use crate::labels::LabelTable;
use crate::lexer::{self, LexError};
use crate::nfa::build::{self, NfaSet};
use crate::token::{self, Kind, Token};
use crate::tree::SyntaxTree;
use thiserror::Error;

pub use crate::nfa::build::TreeError;
pub use parse::{ParseError, Parser};

pub(crate) mod first;
pub mod parse;

/// A non-fatal finding reported during compilation. Collected, not raised:
/// a grammar with diagnostics still compiles, though the affected rules may
/// be unusable at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("nonterminal '{0}' may produce the empty sentence")]
    EmptyProduction(String),
    #[error("left recursion on '{0}'")]
    LeftRecursion(String),
    #[error("cannot translate label '{0}'")]
    UntranslatableLabel(String),
    #[error("unknown start symbol '{0}', using the first rule instead")]
    UnknownStartSymbol(String),
}

/// Compilation knobs: an explicit start symbol and extra terminal names the
/// label translator should recognize beyond the built-in token table.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub start: Option<String>,
    pub additional_tokens: Vec<(String, Kind)>,
}

/// A compiled grammar plus everything the compiler had to say about it.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub grammar: Grammar,
    pub diagnostics: Vec<Diagnostic>,
}

/// Errors from [Grammar::parse_source]: tokenizing the input may fail before
/// the driver ever sees it.
#[derive(Debug, Error)]
pub enum ParseSourceError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A compiled grammar: one minimized DFA per rule, the shared label table,
/// and the start symbol. This value owns everything a parse needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub(crate) dfas: Vec<Dfa>,
    pub(crate) labels: LabelTable,
    pub(crate) start: Kind,
}

impl Grammar {
    /// Compiles a meta-grammar tree with default [Options].
    pub fn compile(tree: &SyntaxTree) -> Result<Compilation, TreeError> {
        Self::compile_with(tree, &Options::default())
    }

    /// Compiles a meta-grammar tree. The only fatal error is a tree that
    /// does not have the RULE/RHS/ALT/ITEM/ATOM shape; everything else ends
    /// up in [Compilation::diagnostics].
    pub fn compile_with(tree: &SyntaxTree, options: &Options) -> Result<Compilation, TreeError> {
        let NfaSet { nfas, mut labels } = build::build(tree)?;
        let mut diagnostics = Vec::new();

        let mut dfas: Vec<Dfa> = nfas
            .iter()
            .map(|nfa| nfa.to_dfa(&mut diagnostics))
            .collect();

        let start = match &options.start {
            None => dfas.first().map_or(token::NT_OFFSET, Dfa::kind),
            Some(name) => match dfas.iter().find(|dfa| dfa.name == *name) {
                Some(dfa) => dfa.kind,
                None => {
                    diagnostics.push(Diagnostic::UnknownStartSymbol(name.clone()));
                    dfas.first().map_or(token::NT_OFFSET, Dfa::kind)
                }
            },
        };

        translate_labels(&mut labels, &dfas, options, &mut diagnostics);
        first::compute(&mut dfas, &labels, &mut diagnostics);

        Ok(Compilation {
            grammar: Grammar {
                dfas,
                labels,
                start,
            },
            diagnostics,
        })
    }

    pub fn dfas(&self) -> &[Dfa] {
        self.dfas.as_slice()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The nonterminal kind parses start from.
    pub fn start(&self) -> Kind {
        self.start
    }

    /// Changes the start symbol for subsequent parses.
    pub fn set_start(&mut self, start: Kind) {
        self.start = start;
    }

    /// The nonterminal kind of the rule called `name`, if any.
    pub fn symbol_kind(&self, name: &str) -> Option<Kind> {
        self.dfas
            .iter()
            .find_map(|dfa| (dfa.name == name).then_some(dfa.kind))
    }

    /// The rule name behind a nonterminal kind, if any.
    pub fn symbol_name(&self, kind: Kind) -> Option<&str> {
        self.dfa_for(kind).map(Dfa::name)
    }

    /// The DFA for a nonterminal kind. Kinds are handed out densely in rule
    /// order, so this is an index computation, not a search.
    pub fn dfa_for(&self, kind: Kind) -> Option<&Dfa> {
        self.dfa_index(kind).map(|index| &self.dfas[index])
    }

    pub(crate) fn dfa_index(&self, kind: Kind) -> Option<usize> {
        if !token::is_nonterminal(kind) {
            return None;
        }
        let index = (kind - token::NT_OFFSET) as usize;
        (index < self.dfas.len()).then_some(index)
    }

    /// Starts a parse from the configured start symbol.
    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self, self.start)
    }

    /// Starts a parse from an explicit nonterminal.
    pub fn parser_for(&self, start: Kind) -> Parser<'_> {
        Parser::new(self, start)
    }

    /// Drives a whole token stream through the grammar and returns the tree
    /// rooted at the start symbol. Tokens after the completing one are
    /// ignored, so a stream ending in NEWLINE ENDMARKER parses cleanly even
    /// when the start rule mentions neither.
    pub fn parse<I>(&self, tokens: I) -> Result<SyntaxTree, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut parser = self.parser();
        for token in tokens {
            if let Some(tree) = parser.feed(&token)? {
                return Ok(tree);
            }
        }
        Err(ParseError::UnexpectedEnd)
    }

    /// Tokenizes and parses a source string.
    pub fn parse_source(&self, source: &str) -> Result<SyntaxTree, ParseSourceError> {
        Ok(self.parse(lexer::tokenize(source)?)?)
    }

    /// Recomputes every FIRST set from the already-translated label table,
    /// returning the diagnostics of the recomputation. The result is
    /// byte-identical to what compilation stored.
    pub fn recompute_first_sets(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        first::compute(&mut self.dfas, &self.labels, &mut diagnostics);
        diagnostics
    }

    /// Renders a tree with rule names resolved through this grammar.
    pub fn render(&self, tree: &SyntaxTree) -> String {
        let resolve = |kind: Kind| -> Option<String> {
            if token::is_nonterminal(kind) {
                self.symbol_name(kind).map(str::to_string)
            } else {
                None
            }
        };
        Rendered {
            tree,
            resolve: &resolve,
        }
        .to_string()
    }

    /// A one-line description of a label, used in parse errors: the rule
    /// name for nonterminals, the quoted lexeme for keywords, the kind name
    /// for plain terminals.
    pub(crate) fn describe_label(&self, index: usize) -> String {
        match self.labels.get(index) {
            None => "<invalid label>".to_string(),
            Some(label) => {
                if token::is_nonterminal(label.kind) {
                    self.symbol_name(label.kind)
                        .map_or_else(|| format!("<{}>", label.kind), str::to_string)
                } else {
                    match (label.kind, label.text()) {
                        (token::NAME, Some(keyword)) => format!("'{keyword}'"),
                        (kind, _) => token::name(kind).unwrap_or("<unknown token>").to_string(),
                    }
                }
            }
        }
    }
}

struct Rendered<'a> {
    tree: &'a SyntaxTree,
    resolve: &'a dyn Fn(Kind) -> Option<String>,
}

impl std::fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.tree.write_indented(f, 0, self.resolve)
    }
}

/// Rewrites every label into executable form, in one pass over the table.
/// Rule names win over token names, which win over nothing; quoted literals
/// become keywords when they look like identifiers and operator kinds when
/// the spelling is known. Anything else is reported and demoted to an
/// ERRORTOKEN marker (keeping its spelling for messages), a form
/// [Label::matches](crate::labels::Label) rejects unconditionally, so any
/// parse that reaches it fails rather than misbehaves.
fn translate_labels(
    labels: &mut LabelTable,
    dfas: &[Dfa],
    options: &Options,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for index in 0..labels.labels.len() {
        let (kind, text) = {
            let label = &labels.labels[index];
            (label.kind, label.text.clone())
        };
        let Some(text) = text else { continue };
        match kind {
            token::NAME => {
                if let Some(dfa) = dfas.iter().find(|dfa| dfa.name == text) {
                    labels.labels[index].kind = dfa.kind;
                    labels.labels[index].text = None;
                } else if let Some(kind) = token::by_name(&text).or_else(|| {
                    options
                        .additional_tokens
                        .iter()
                        .find_map(|(name, kind)| (*name == text).then_some(*kind))
                }) {
                    labels.labels[index].kind = kind;
                    labels.labels[index].text = None;
                } else {
                    // An untranslated name must not be left looking like a
                    // keyword, which is also (NAME, text); mark it so it can
                    // never match a token
                    labels.labels[index].kind = token::ERRORTOKEN;
                    diagnostics.push(Diagnostic::UntranslatableLabel(text));
                }
            }
            token::STRING => {
                let quoted = text.len() >= 2
                    && text.chars().next() == text.chars().last()
                    && matches!(text.chars().next(), Some('\'') | Some('"'));
                if !quoted {
                    diagnostics.push(Diagnostic::UntranslatableLabel(text));
                    continue;
                }
                let inner = &text[1..text.len() - 1];
                let starts_like_name = inner
                    .chars()
                    .next()
                    .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
                if starts_like_name {
                    labels.labels[index].kind = token::NAME;
                    labels.labels[index].text = Some(inner.to_string());
                } else if let Some(kind) = token::operator(inner) {
                    labels.labels[index].kind = kind;
                    labels.labels[index].text = None;
                } else {
                    diagnostics.push(Diagnostic::UntranslatableLabel(text));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    fn compile(source: &str) -> Compilation {
        Grammar::compile(&meta::parse_source(source).unwrap()).unwrap()
    }

    #[test]
    fn labels_translate_to_executable_forms() {
        let c = compile("a: b 'if' '+' NUMBER\nb: 'x'\n");
        assert!(c.diagnostics.is_empty());
        let labels = c.grammar.labels();
        // 0 EMPTY, 1 rule a, 2 reference to b, 3 'if', 4 '+', 5 NUMBER, 6 'x'
        assert_eq!(labels.len(), 7);
        let forms: Vec<_> = labels
            .iter()
            .map(|l| (l.kind(), l.text().map(str::to_string)))
            .collect();
        assert_eq!(forms[1], (token::NT_OFFSET, None)); // rule a
        assert_eq!(forms[2], (token::NT_OFFSET + 1, None)); // reference to b
        assert_eq!(forms[3], (token::NAME, Some("if".to_string()))); // keyword
        assert_eq!(forms[4], (token::PLUS, None)); // operator
        assert_eq!(forms[5], (token::NUMBER, None)); // token name
    }

    #[test]
    fn untranslatable_labels_are_reported_and_never_match() {
        let c = compile("a: nosuchrule '%%'\n");
        assert_eq!(
            c.diagnostics,
            vec![
                Diagnostic::UntranslatableLabel("nosuchrule".to_string()),
                Diagnostic::UntranslatableLabel("'%%'".to_string()),
            ]
        );
        let labels = c.grammar.labels();
        // The spellings survive for messages, but neither entry is in a form
        // a token can match: a NAME label left as (NAME, text) would act as
        // the keyword "nosuchrule"
        assert_eq!(labels.get(2).unwrap().kind(), token::ERRORTOKEN);
        assert_eq!(labels.get(2).unwrap().text(), Some("nosuchrule"));
        assert_eq!(labels.get(3).unwrap().kind(), token::STRING);
        assert_eq!(labels.get(3).unwrap().text(), Some("'%%'"));
        let err = c.grammar.parse_source("nosuchrule\n").unwrap_err();
        assert!(matches!(err, ParseSourceError::Parse(_)));
    }

    #[test]
    fn additional_tokens_extend_the_name_table() {
        let tree = meta::parse_source("a: DOLLAR\n").unwrap();
        let options = Options {
            additional_tokens: vec![("DOLLAR".to_string(), 100)],
            ..Options::default()
        };
        let c = Grammar::compile_with(&tree, &options).unwrap();
        assert!(c.diagnostics.is_empty());
        assert_eq!(c.grammar.labels().get(2).unwrap().kind(), 100);
    }

    #[test]
    fn start_symbol_selection_and_fallback() {
        let tree = meta::parse_source("a: 'x'\nb: 'y'\n").unwrap();
        let chosen = Grammar::compile_with(
            &tree,
            &Options {
                start: Some("b".to_string()),
                ..Options::default()
            },
        )
        .unwrap();
        assert_eq!(chosen.grammar.start(), token::NT_OFFSET + 1);

        let fallback = Grammar::compile_with(
            &tree,
            &Options {
                start: Some("zzz".to_string()),
                ..Options::default()
            },
        )
        .unwrap();
        assert_eq!(fallback.grammar.start(), token::NT_OFFSET);
        assert_eq!(
            fallback.diagnostics,
            vec![Diagnostic::UnknownStartSymbol("zzz".to_string())]
        );
    }

    #[test]
    fn symbol_maps_are_inverses() {
        let c = compile("a: 'x'\nb: 'y'\n");
        let g = &c.grammar;
        assert_eq!(g.symbol_kind("b"), Some(token::NT_OFFSET + 1));
        assert_eq!(g.symbol_name(token::NT_OFFSET + 1), Some("b"));
        assert_eq!(g.symbol_kind("zzz"), None);
        assert_eq!(g.symbol_name(token::NT_OFFSET + 9), None);
    }

    #[test]
    fn render_resolves_rule_names() {
        let c = compile("greeting: 'hello' NAME\n");
        let tree = c.grammar.parse_source("hello world\n").unwrap();
        let rendered = c.grammar.render(&tree);
        assert_eq!(rendered, "greeting\n  NAME \"hello\"\n  NAME \"world\"\n");
    }
}
