//! # Tokenizer
//! Splits grammar sources (and the inputs fed to generated parsers) into
//! [Token]s. The token language is small: identifiers, decimal numbers,
//! single- or double-quoted string literals without escapes, and the operator
//! spellings listed in [crate::token]. `#` starts a comment running to the
//! end of the line.
//!
//! Newline handling follows the usual logical-line convention: a NEWLINE
//! token is emitted at the end of every line that contained at least one
//! token, blank and comment-only lines produce nothing, and newlines inside
//! parentheses or square brackets are implicit continuations. The stream
//! always ends with a NEWLINE (synthesized if the source does not end in one)
//! followed by ENDMARKER.
//!
//! ```
//! use grebe::lexer;
//! use grebe::token;
//!
//! let tokens = lexer::tokenize("rule: NAME ':' # trailing comment\n").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         token::NAME,
//!         token::COLON,
//!         token::NAME,
//!         token::STRING,
//!         token::NEWLINE,
//!         token::ENDMARKER,
//!     ]
//! );
//! ```

use crate::token::{self, Kind, Token};
use nom::branch::alt;
use nom::bytes::complete::{take_till, take_while, take_while1, take_while_m_n};
use nom::character::complete::char;
use nom::combinator::recognize;
use nom::sequence::{delimited, pair};
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Line {line}: unrecognized character {ch:?}")]
    UnrecognizedCharacter { ch: char, line: u32 },
    #[error("Line {line}: unterminated string literal")]
    UnterminatedString { line: u32 },
}

/// Breaks `source` into tokens, ending with NEWLINE ENDMARKER.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line: u32 = 1;
    // Open parentheses/brackets; newlines don't end the logical line inside
    let mut depth: usize = 0;
    let mut line_has_tokens = false;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
            if line_has_tokens && depth == 0 {
                tokens.push(Token::new(token::NEWLINE, "", line));
                line_has_tokens = false;
            }
            line += 1;
            rest = after;
            continue;
        }
        let ch = rest.chars().next().expect("rest is non-empty");
        match ch {
            ' ' | '\t' | '\x0c' => {
                rest = &rest[ch.len_utf8()..];
            }
            '#' => {
                let end = rest.find('\n').unwrap_or(rest.len());
                rest = &rest[end..];
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let (after, text) = name(rest).expect("a letter or underscore starts a NAME");
                tokens.push(Token::new(token::NAME, text, line));
                line_has_tokens = true;
                rest = after;
            }
            '0'..='9' => {
                let (after, text) = number(rest).expect("a digit starts a NUMBER");
                tokens.push(Token::new(token::NUMBER, text, line));
                line_has_tokens = true;
                rest = after;
            }
            '\'' | '"' => match string(rest) {
                Ok((after, text)) => {
                    tokens.push(Token::new(token::STRING, text, line));
                    line_has_tokens = true;
                    rest = after;
                }
                Err(_) => return Err(LexError::UnterminatedString { line }),
            },
            _ => match token::leading_operator(rest) {
                Some((spelling, kind)) => {
                    match kind {
                        token::LPAR | token::LSQB => depth += 1,
                        token::RPAR | token::RSQB => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    tokens.push(Token::new(kind, spelling, line));
                    line_has_tokens = true;
                    rest = &rest[spelling.len()..];
                }
                None => return Err(LexError::UnrecognizedCharacter { ch, line }),
            },
        }
    }

    if line_has_tokens {
        tokens.push(Token::new(token::NEWLINE, "", line));
        line += 1;
    }
    tokens.push(Token::new(token::ENDMARKER, "", line));
    Ok(tokens)
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while_m_n(1, 1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit())(input)
}

fn string(input: &str) -> IResult<&str, &str> {
    // The lexeme keeps its quotes; label translation strips them
    recognize(alt((
        delimited(char('\''), take_till(|c| c == '\'' || c == '\n'), char('\'')),
        delimited(char('"'), take_till(|c| c == '"' || c == '\n'), char('"')),
    )))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{
        ARROW, COLON, ENDMARKER, LSQB, NAME, NEWLINE, NUMBER, RSQB, STAR, STRING, VBAR,
    };

    fn kinds(source: &str) -> Vec<Kind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_rule_line() {
        let tokens = tokenize("item: '[' rhs ']' | atom '*'\n").unwrap();
        let expected = [
            (NAME, "item"),
            (COLON, ":"),
            (STRING, "'['"),
            (NAME, "rhs"),
            (STRING, "']'"),
            (VBAR, "|"),
            (NAME, "atom"),
            (STRING, "'*'"),
            (NEWLINE, ""),
            (ENDMARKER, ""),
        ];
        assert_eq!(tokens.len(), expected.len());
        for (tok, &(kind, text)) in tokens.iter().zip(&expected) {
            assert_eq!((tok.kind, tok.text.as_str()), (kind, text));
        }
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(kinds(""), vec![ENDMARKER]);
        assert_eq!(kinds("\n\n# nothing here\n"), vec![ENDMARKER]);
        assert_eq!(kinds("x # eol comment\n\n"), vec![NAME, NEWLINE, ENDMARKER]);
    }

    #[test]
    fn synthesizes_trailing_newline() {
        assert_eq!(kinds("x"), vec![NAME, NEWLINE, ENDMARKER]);
    }

    #[test]
    fn brackets_continue_the_line() {
        assert_eq!(
            kinds("a [\n  b\n] c\n"),
            vec![NAME, LSQB, NAME, RSQB, NAME, NEWLINE, ENDMARKER]
        );
    }

    #[test]
    fn longest_operator_and_numbers() {
        let tokens = tokenize("f -> 42 * x").unwrap();
        let expected = [NAME, ARROW, NUMBER, STAR, NAME, NEWLINE, ENDMARKER];
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            expected.to_vec()
        );
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("a\nb\n").unwrap();
        assert_eq!(tokens[0].line, 1); // a
        assert_eq!(tokens[2].line, 2); // b
        assert_eq!(tokens.last().unwrap().line, 3); // ENDMARKER
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            tokenize("a ? b"),
            Err(LexError::UnrecognizedCharacter { ch: '?', line: 1 })
        );
        assert_eq!(
            tokenize("a: 'unclosed\n"),
            Err(LexError::UnterminatedString { line: 1 })
        );
    }
}
