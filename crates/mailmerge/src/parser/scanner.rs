//! Template scanner using winnow.
//!
//! Walks the template once, left to right. At every `{` it tries, in order:
//! - a conditional marker: `{#if KEY}`, `{#else if KEY}`, `{#else}`, `{#end if}`
//! - a filter or format directive: `{key|filter:NAME}`, `{key|format:NAME}`
//! - a variable: `{key}`
//!
//! A matched placeholder is consumed whole, so tokens never overlap. A `{`
//! that starts none of these is ordinary text.

use winnow::ascii::{Caseless, multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, preceded, terminated};
use winnow::prelude::*;
use winnow::token::{literal, take_till, take_while};

use super::ast::{ConditionalMarker, MarkerKind, Token, TokenKind};

/// Placeholders found in a template, each list sorted by offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub variables: Vec<Token>,
    pub filters: Vec<Token>,
    pub formats: Vec<Token>,
    pub markers: Vec<ConditionalMarker>,
}

/// What a single `{...}` span turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'i> {
    Marker {
        kind: MarkerKind,
        key: &'i str,
    },
    Directive {
        kind: TokenKind,
        key: &'i str,
        transform: &'i str,
    },
    Variable {
        key: &'i str,
    },
}

/// Scan template text into positioned placeholders.
///
/// Never fails: anything that does not parse as a placeholder is literal
/// text and produces no token.
pub fn scan(input: &str) -> Scan {
    let mut found = Scan::default();
    let mut remaining = input;

    loop {
        // Skip to the next candidate. Taking zero or more is infallible.
        let _ = literal_run(&mut remaining);
        if remaining.is_empty() {
            break;
        }

        let index = input.len() - remaining.len();
        let checkpoint = remaining;
        match placeholder(&mut remaining) {
            Ok(piece) => {
                let raw = &checkpoint[..checkpoint.len() - remaining.len()];
                found.push(piece, index, raw);
            }
            Err(_) => {
                // Unmatched `{` is literal; resume right after it.
                remaining = &checkpoint[1..];
            }
        }
    }

    found
}

impl Scan {
    fn push(&mut self, piece: Piece<'_>, index: usize, raw: &str) {
        match piece {
            Piece::Marker { kind, key } => self.markers.push(ConditionalMarker {
                kind,
                key: key.trim().to_string(),
                index,
                length: raw.len(),
                body_text: String::new(),
            }),
            Piece::Directive {
                kind,
                key,
                transform,
            } => {
                let token = Token {
                    kind,
                    key: key.to_string(),
                    index,
                    length: raw.len(),
                    raw: raw.to_string(),
                    transform: Some(transform.to_string()),
                };
                if kind == TokenKind::Filter {
                    self.filters.push(token);
                } else {
                    self.formats.push(token);
                }
            }
            Piece::Variable { key } => self.variables.push(Token {
                kind: TokenKind::Variable,
                key: key.to_string(),
                index,
                length: raw.len(),
                raw: raw.to_string(),
                transform: None,
            }),
        }
    }
}

/// Consume text up to (not including) the next `{`.
fn literal_run<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(0.., '{').parse_next(input)
}

/// Parse one placeholder starting at `{`.
fn placeholder<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    alt((marker, directive, variable)).parse_next(input)
}

// =============================================================================
// Conditional markers
// =============================================================================

/// Parse `{# ... }`. Each form must reach the closing brace on its own, so
/// `{#else iffy}` falls back from `else if` to `else` with trailing text.
fn marker<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    preceded(
        "{#",
        alt((
            terminated(end_marker, '}'),
            terminated(else_if_marker, '}'),
            terminated(else_marker, '}'),
            terminated(if_marker, '}'),
        )),
    )
    .parse_next(input)
}

/// `end if` / `endif`, trailing text ignored.
fn end_marker<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    (
        literal(Caseless("end")),
        multispace0,
        literal(Caseless("if")),
        opt(trailing),
    )
        .map(|_| Piece::Marker {
            kind: MarkerKind::End,
            key: "",
        })
        .parse_next(input)
}

/// `else if KEY` / `elseif KEY`.
fn else_if_marker<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    (
        literal(Caseless("else")),
        multispace0,
        literal(Caseless("if")),
        opt(trailing),
    )
        .map(|(_, _, _, key)| Piece::Marker {
            kind: MarkerKind::ElseIf,
            key: key.unwrap_or_default(),
        })
        .parse_next(input)
}

/// `else`, trailing text ignored.
fn else_marker<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    (literal(Caseless("else")), opt(trailing))
        .map(|_| Piece::Marker {
            kind: MarkerKind::Else,
            key: "",
        })
        .parse_next(input)
}

/// `if KEY`.
fn if_marker<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    (literal(Caseless("if")), opt(trailing))
        .map(|(_, key)| Piece::Marker {
            kind: MarkerKind::If,
            key: key.unwrap_or_default(),
        })
        .parse_next(input)
}

/// Whitespace followed by everything up to the closing brace.
fn trailing<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded(multispace1, take_till(0.., ['{', '}'])).parse_next(input)
}

// =============================================================================
// Directives and variables
// =============================================================================

/// Parse `{key|filter:NAME}` or `{key|format:NAME}`.
fn directive<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    delimited(
        '{',
        (word_key, '|', directive_kind, ':', transform_name),
        '}',
    )
    .map(|(key, _, kind, _, transform)| Piece::Directive {
        kind,
        key,
        transform,
    })
    .parse_next(input)
}

/// `filter` or `format`, case-insensitive.
fn directive_kind(input: &mut &str) -> ModalResult<TokenKind> {
    alt((
        literal(Caseless("filter")).value(TokenKind::Filter),
        literal(Caseless("format")).value(TokenKind::Format),
    ))
    .parse_next(input)
}

/// Directive keys are ASCII word characters.
fn word_key<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

fn transform_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(1.., ['{', '}']).parse_next(input)
}

/// Parse `{key}`. The key excludes `{`, `}`, `#` and `|`.
fn variable<'i>(input: &mut &'i str) -> ModalResult<Piece<'i>> {
    delimited('{', take_till(1.., ['{', '}', '#', '|']), '}')
        .map(|key| Piece::Variable { key })
        .parse_next(input)
}
