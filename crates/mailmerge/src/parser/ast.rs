//! Positioned template tokens produced by the scanner.
//!
//! Every offset is a byte offset into the original template text and is
//! never adjusted after scanning. The resolver works on its own copies.

use std::fmt;

use serde::Serialize;

/// The kind of a substitution token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// `{key}`
    Variable,
    /// `{key|filter:name}`
    Filter,
    /// `{key|format:name}`
    Format,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Variable => f.write_str("variable"),
            TokenKind::Filter => f.write_str("filter"),
            TokenKind::Format => f.write_str("format"),
        }
    }
}

/// A variable, filter, or format placeholder located in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Lookup name in the data record.
    pub key: String,
    /// Byte offset of the opening `{`.
    pub index: usize,
    /// Byte length of `raw`.
    pub length: usize,
    /// The complete matched text, braces included.
    pub raw: String,
    /// Filter or format name, verbatim. `None` for variables.
    pub transform: Option<String>,
}

impl Token {
    /// Byte offset one past the closing `}`.
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// The keyword of a conditional marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    If,
    ElseIf,
    Else,
    End,
}

impl MarkerKind {
    /// Whether this marker carries a key to test for.
    pub fn is_conditional(self) -> bool {
        matches!(self, MarkerKind::If | MarkerKind::ElseIf)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::If => f.write_str("{#if}"),
            MarkerKind::ElseIf => f.write_str("{#else if}"),
            MarkerKind::Else => f.write_str("{#else}"),
            MarkerKind::End => f.write_str("{#end if}"),
        }
    }
}

/// A `{#if}`, `{#else if}`, `{#else}`, or `{#end if}` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalMarker {
    pub kind: MarkerKind,
    /// Key tested for presence. Empty for `Else` and `End`.
    pub key: String,
    pub index: usize,
    pub length: usize,
    /// Text between the end of this marker and the start of the next
    /// marker of the same block. Empty until the block is assembled, and
    /// always empty for `End`.
    pub body_text: String,
}

impl ConditionalMarker {
    /// Byte offset one past the closing `}`.
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// One `{#if}` ... `{#end if}` group of mutually exclusive branches.
///
/// `markers` starts with an `If` and ends with the `End` that closes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalBlock {
    pub markers: Vec<ConditionalMarker>,
}

impl ConditionalBlock {
    /// Offset of the opening `{#if`.
    pub fn start(&self) -> usize {
        self.markers.first().map_or(0, |m| m.index)
    }

    /// Offset one past the closing `{#end if}`.
    pub fn end(&self) -> usize {
        self.markers.last().map_or(0, ConditionalMarker::end)
    }

    /// Whether `index` lies inside the block's span.
    pub fn contains(&self, index: usize) -> bool {
        (self.start()..self.end()).contains(&index)
    }

    /// Markers that open a branch, in document order, excluding the `End`.
    pub fn branches(&self) -> impl Iterator<Item = &ConditionalMarker> {
        let mut seen_else = false;
        self.markers.iter().filter(move |m| match m.kind {
            MarkerKind::If | MarkerKind::ElseIf => true,
            MarkerKind::Else if !seen_else => {
                seen_else = true;
                true
            }
            MarkerKind::Else | MarkerKind::End => false,
        })
    }

    /// Pick the surviving branch: the first conditional branch whose key
    /// satisfies `is_present`, else the first `Else`, else nothing. A branch
    /// with an empty key never matches.
    pub fn select(&self, is_present: impl Fn(&str) -> bool) -> Option<&ConditionalMarker> {
        self.branches()
            .filter(|m| m.kind.is_conditional() && !m.key.is_empty())
            .find(|m| is_present(&m.key))
            .or_else(|| self.branches().find(|m| m.kind == MarkerKind::Else))
    }
}
