//! Resolution of a compiled template against one record.
//!
//! Resolution splices replacements into a working copy of the template
//! text, left to right, in four passes:
//!
//! 1. conditional blocks, each replaced by its surviving branch body
//! 2. variables
//! 3. filters
//! 4. formats
//!
//! Every splice changes the length of the text, so the working set keeps its
//! own copy of each token's offset and shifts the offsets of tokens still
//! waiting to be applied. Tokens inside a block move with the branch body
//! that keeps them, or are dropped with a branch that does not survive. The
//! compiled template is never modified.

use std::ops::Range;

use tracing::trace;

use crate::engine::MergeContext;
use crate::parser::{Token, TokenKind};
use crate::types::Template;

/// Token passes after conditional blocks, in application order.
const TOKEN_PASSES: [TokenKind; 3] = [TokenKind::Variable, TokenKind::Filter, TokenKind::Format];

/// Resolve `template` against the context's record.
///
/// Tokens whose key is absent are left as their raw text. Infallible for
/// any template `Template::compile` accepts.
pub fn resolve(template: &Template, ctx: &MergeContext<'_>) -> String {
    let mut working = WorkingSet::new(template);

    let mut shift = 0isize;
    for block in template.blocks() {
        let start = block.start().saturating_add_signed(shift);
        let end = block.end().saturating_add_signed(shift);
        let branch = block.select(|key| ctx.is_present(key)).map(|marker| {
            let body_start = marker.end().saturating_add_signed(shift);
            body_start..body_start + marker.body_text.len()
        });
        trace!(start, end, ?branch, "resolving conditional block");
        shift += working.splice_block(start..end, branch);
    }

    for kind in TOKEN_PASSES {
        for position in 0..working.tokens.len() {
            let pending = working.tokens[position];
            if !pending.live || pending.token.kind != kind {
                continue;
            }
            if let Some(replacement) = ctx.replacement(pending.token) {
                working.splice_token(position, &replacement);
            }
        }
    }

    working.text
}

/// A token copied into the working set with its current offset.
#[derive(Debug, Clone, Copy)]
struct WorkingToken<'t> {
    token: &'t Token,
    /// Offset in the working text.
    index: usize,
    /// False once the token has been replaced or dropped with its branch.
    live: bool,
}

impl WorkingToken<'_> {
    fn span(&self) -> Range<usize> {
        self.index..self.index + self.token.length
    }
}

/// The text being rewritten and the tokens not yet applied to it.
struct WorkingSet<'t> {
    text: String,
    tokens: Vec<WorkingToken<'t>>,
}

impl<'t> WorkingSet<'t> {
    fn new(template: &'t Template) -> Self {
        let tokens = template
            .tokens()
            .map(|token| WorkingToken {
                token,
                index: token.index,
                live: true,
            })
            .collect();
        Self {
            text: template.source().to_string(),
            tokens,
        }
    }

    /// Replace a whole block with the text of `branch` (a range inside the
    /// block), or with nothing. Returns the change in text length.
    fn splice_block(&mut self, block: Range<usize>, branch: Option<Range<usize>>) -> isize {
        let replacement = branch
            .clone()
            .map(|body| self.text[body].to_string())
            .unwrap_or_default();
        let delta = length_delta(block.len(), replacement.len());

        for pending in self.tokens.iter_mut().filter(|t| t.live) {
            if pending.index >= block.end {
                pending.index = pending.index.saturating_add_signed(delta);
            } else if pending.index >= block.start {
                match &branch {
                    Some(body) if body.start <= pending.index && pending.span().end <= body.end => {
                        pending.index = block.start + (pending.index - body.start);
                    }
                    _ => pending.live = false,
                }
            }
        }

        self.text.replace_range(block, &replacement);
        delta
    }

    /// Replace the token at `position` and shift every live token after it.
    fn splice_token(&mut self, position: usize, replacement: &str) {
        let pending = &mut self.tokens[position];
        pending.live = false;
        let span = pending.span();
        debug_assert_eq!(&self.text[span.clone()], pending.token.raw);

        let delta = length_delta(span.len(), replacement.len());
        for later in self
            .tokens
            .iter_mut()
            .filter(|t| t.live && t.index >= span.end)
        {
            later.index = later.index.saturating_add_signed(delta);
        }

        self.text.replace_range(span, replacement);
    }
}

/// Signed change in length when `removed` bytes become `inserted` bytes.
fn length_delta(removed: usize, inserted: usize) -> isize {
    if inserted >= removed {
        isize::try_from(inserted - removed).unwrap_or(isize::MAX)
    } else {
        isize::try_from(removed - inserted).map_or(isize::MIN, |n| -n)
    }
}
