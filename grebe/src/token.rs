//! # Token kinds
//! The token-kind space shared by the [tokenizer](crate::lexer), the grammar
//! compiler and generated parsers. Kinds are plain integers: everything below
//! [NT_OFFSET] is a terminal produced by the tokenizer, and the compiler
//! assigns kinds at or above [NT_OFFSET] to the nonterminals of a grammar, in
//! declaration order.

/// A token or symbol kind. Terminal kinds are listed in this module;
/// nonterminal kinds are `NT_OFFSET + rule-index` and only exist relative to
/// a compiled [Grammar](crate::grammar::Grammar).
pub type Kind = u16;

pub const ENDMARKER: Kind = 0;
pub const NAME: Kind = 1;
pub const NUMBER: Kind = 2;
pub const STRING: Kind = 3;
pub const NEWLINE: Kind = 4;
pub const LPAR: Kind = 5;
pub const RPAR: Kind = 6;
pub const LSQB: Kind = 7;
pub const RSQB: Kind = 8;
pub const COLON: Kind = 9;
pub const COMMA: Kind = 10;
pub const SEMI: Kind = 11;
pub const PLUS: Kind = 12;
pub const MINUS: Kind = 13;
pub const STAR: Kind = 14;
pub const SLASH: Kind = 15;
pub const VBAR: Kind = 16;
pub const AMPER: Kind = 17;
pub const LESS: Kind = 18;
pub const GREATER: Kind = 19;
pub const EQUAL: Kind = 20;
pub const DOT: Kind = 21;
pub const PERCENT: Kind = 22;
pub const LBRACE: Kind = 23;
pub const RBRACE: Kind = 24;
pub const TILDE: Kind = 25;
pub const CIRCUMFLEX: Kind = 26;
pub const AT: Kind = 27;
pub const EQEQUAL: Kind = 28;
pub const NOTEQUAL: Kind = 29;
pub const LESSEQUAL: Kind = 30;
pub const GREATEREQUAL: Kind = 31;
pub const LEFTSHIFT: Kind = 32;
pub const RIGHTSHIFT: Kind = 33;
pub const DOUBLESTAR: Kind = 34;
pub const DOUBLESLASH: Kind = 35;
pub const ARROW: Kind = 36;
pub const COLONEQUAL: Kind = 37;
pub const ELLIPSIS: Kind = 38;
pub const ERRORTOKEN: Kind = 39;

/// First nonterminal kind. Kinds below this value are terminals.
pub const NT_OFFSET: Kind = 256;

const NAMES: &[(Kind, &str)] = &[
    (ENDMARKER, "ENDMARKER"),
    (NAME, "NAME"),
    (NUMBER, "NUMBER"),
    (STRING, "STRING"),
    (NEWLINE, "NEWLINE"),
    (LPAR, "LPAR"),
    (RPAR, "RPAR"),
    (LSQB, "LSQB"),
    (RSQB, "RSQB"),
    (COLON, "COLON"),
    (COMMA, "COMMA"),
    (SEMI, "SEMI"),
    (PLUS, "PLUS"),
    (MINUS, "MINUS"),
    (STAR, "STAR"),
    (SLASH, "SLASH"),
    (VBAR, "VBAR"),
    (AMPER, "AMPER"),
    (LESS, "LESS"),
    (GREATER, "GREATER"),
    (EQUAL, "EQUAL"),
    (DOT, "DOT"),
    (PERCENT, "PERCENT"),
    (LBRACE, "LBRACE"),
    (RBRACE, "RBRACE"),
    (TILDE, "TILDE"),
    (CIRCUMFLEX, "CIRCUMFLEX"),
    (AT, "AT"),
    (EQEQUAL, "EQEQUAL"),
    (NOTEQUAL, "NOTEQUAL"),
    (LESSEQUAL, "LESSEQUAL"),
    (GREATEREQUAL, "GREATEREQUAL"),
    (LEFTSHIFT, "LEFTSHIFT"),
    (RIGHTSHIFT, "RIGHTSHIFT"),
    (DOUBLESTAR, "DOUBLESTAR"),
    (DOUBLESLASH, "DOUBLESLASH"),
    (ARROW, "ARROW"),
    (COLONEQUAL, "COLONEQUAL"),
    (ELLIPSIS, "ELLIPSIS"),
    (ERRORTOKEN, "ERRORTOKEN"),
    (NT_OFFSET, "NT_OFFSET"),
];

/// Operator spellings and the kinds they refine to. Grammars refer to these
/// as quoted literals (`':'`, `'->'`), and the tokenizer uses the same table
/// to split operator runs, preferring the longest spelling.
const OPERATORS: &[(&str, Kind)] = &[
    ("(", LPAR),
    (")", RPAR),
    ("[", LSQB),
    ("]", RSQB),
    (":", COLON),
    (",", COMMA),
    (";", SEMI),
    ("+", PLUS),
    ("-", MINUS),
    ("*", STAR),
    ("/", SLASH),
    ("|", VBAR),
    ("&", AMPER),
    ("<", LESS),
    (">", GREATER),
    ("=", EQUAL),
    (".", DOT),
    ("%", PERCENT),
    ("{", LBRACE),
    ("}", RBRACE),
    ("~", TILDE),
    ("^", CIRCUMFLEX),
    ("@", AT),
    ("==", EQEQUAL),
    ("!=", NOTEQUAL),
    ("<>", NOTEQUAL),
    ("<=", LESSEQUAL),
    (">=", GREATEREQUAL),
    ("<<", LEFTSHIFT),
    (">>", RIGHTSHIFT),
    ("**", DOUBLESTAR),
    ("//", DOUBLESLASH),
    ("->", ARROW),
    (":=", COLONEQUAL),
    ("...", ELLIPSIS),
];

/// The symbolic name of a terminal kind, if it has one.
pub fn name(kind: Kind) -> Option<&'static str> {
    NAMES
        .iter()
        .find_map(|&(k, name)| (k == kind).then_some(name))
}

/// Looks up a terminal kind by its symbolic name (`"NAME"`, `"COLON"`, ...).
pub fn by_name(name: &str) -> Option<Kind> {
    NAMES.iter().find_map(|&(k, n)| (n == name).then_some(k))
}

/// Looks up the kind an operator spelling refines to (`":"`, `"->"`, ...).
pub fn operator(spelling: &str) -> Option<Kind> {
    OPERATORS
        .iter()
        .find_map(|&(s, k)| (s == spelling).then_some(k))
}

/// The longest operator spelling that `input` starts with, with its kind.
pub(crate) fn leading_operator(input: &str) -> Option<(&'static str, Kind)> {
    OPERATORS
        .iter()
        .filter(|(s, _)| input.starts_with(s))
        .max_by_key(|(s, _)| s.len())
        .copied()
}

/// Checks if a kind denotes a nonterminal of some compiled grammar.
pub fn is_nonterminal(kind: Kind) -> bool {
    kind >= NT_OFFSET
}

/// A single token: its kind, its raw lexeme (empty for synthesized NEWLINE
/// and ENDMARKER tokens) and the 1-based line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: Kind, text: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }

    /// A human-readable description used in error messages: the lexeme when
    /// there is one, the kind name otherwise.
    pub fn describe(&self) -> String {
        if self.text.is_empty() {
            name(self.kind).unwrap_or("<unknown token>").to_string()
        } else {
            format!("{:?}", self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &(kind, n) in NAMES {
            assert_eq!(by_name(n), Some(kind));
        }
        assert_eq!(name(COLON), Some("COLON"));
        assert_eq!(by_name("no_such_token"), None);
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(leading_operator("->x"), Some(("->", ARROW)));
        assert_eq!(leading_operator("-x"), Some(("-", MINUS)));
        assert_eq!(leading_operator("...y"), Some(("...", ELLIPSIS)));
        assert_eq!(leading_operator("x"), None);
    }
}
