//! Conditional block assembly.
//!
//! Groups scanned markers into flat `{#if}` ... `{#end if}` blocks and fills
//! in each branch's body text. Blocks never nest: a block runs from an `If`
//! to the first `End` after it, and any `If` in between is one more branch.

use super::ast::{ConditionalBlock, ConditionalMarker, MarkerKind};

/// Markers with their body text filled in, plus the blocks they form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Every scanned marker in document order. Markers that belong to no
    /// block keep an empty body.
    pub markers: Vec<ConditionalMarker>,
    pub blocks: Vec<ConditionalBlock>,
}

/// Assemble markers (sorted by offset) found in `text` into blocks.
pub fn assemble(text: &str, mut markers: Vec<ConditionalMarker>) -> Assembly {
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;

    for i in 0..markers.len() {
        let Some(start) = open else {
            if markers[i].kind == MarkerKind::If {
                open = Some(i);
            }
            continue;
        };

        // Once a block is open every following marker belongs to it, so the
        // previous marker is always part of the same block.
        let body = &text[markers[i - 1].end()..markers[i].index];
        markers[i - 1].body_text = body.to_string();

        if markers[i].kind == MarkerKind::End {
            blocks.push(ConditionalBlock {
                markers: markers[start..=i].to_vec(),
            });
            open = None;
        }
    }

    // An unterminated block stays literal text.
    if let Some(start) = open {
        for marker in &mut markers[start..] {
            marker.body_text.clear();
        }
    }

    Assembly { markers, blocks }
}
