//! Lint checks for templates and records.
//!
//! Works on the compiled template without merging anything, so the checks
//! can run once per template and once per record before output is written.

use strsim::levenshtein;

use crate::engine::error::MergeWarning;
use crate::engine::transforms::{TransformKind, TransformRegistry};
use crate::parser::MarkerKind;
use crate::types::{DataRecord, Template};

/// Checks the template itself: stray markers, unterminated blocks, and
/// filter or format names with no registered transform.
pub fn check_template(template: &Template, transforms: &TransformRegistry) -> Vec<MergeWarning> {
    let mut warnings = Vec::new();
    check_markers(template, &mut warnings);
    check_transforms(template, transforms, &mut warnings);
    warnings.sort_by_key(|w| w.span());
    warnings
}

/// Checks a record against the template: every token that would remain in
/// the output unresolved, with suggestions from the record's keys.
///
/// Tokens inside a branch that does not survive for this record are not
/// reported.
pub fn check_record(template: &Template, record: &DataRecord) -> Vec<MergeWarning> {
    let available: Vec<String> = record.keys().map(ToString::to_string).collect();
    let mut warnings: Vec<MergeWarning> = template
        .tokens()
        .filter(|token| !record.contains_key(&token.key))
        .filter(|token| survives(template, record, token.index))
        .map(|token| MergeWarning::UnresolvedKey {
            key: token.key.clone(),
            index: token.index,
            length: token.length,
            suggestions: compute_suggestions(&token.key, &available),
        })
        .collect();
    warnings.sort_by_key(|w| w.span());
    warnings
}

/// Compute typo suggestions for an unknown key.
///
/// Returns up to three candidates within edit distance 1 (keys of up to
/// three bytes) or 2 (longer keys), closest first.
pub fn compute_suggestions(name: &str, available: &[String]) -> Vec<String> {
    let max_distance = if name.len() <= 3 { 1 } else { 2 };
    let mut suggestions: Vec<(usize, String)> = available
        .iter()
        .filter_map(|candidate| {
            let dist = levenshtein(name, candidate);
            if dist <= max_distance && dist > 0 {
                Some((dist, candidate.clone()))
            } else {
                None
            }
        })
        .collect();

    suggestions.sort_by_key(|(dist, _)| *dist);
    suggestions.into_iter().take(3).map(|(_, s)| s).collect()
}

/// Whether text at `index` is kept in the output for `record`.
fn survives(template: &Template, record: &DataRecord, index: usize) -> bool {
    let Some(block) = template.block_at(index) else {
        return true;
    };
    block
        .select(|key| record.contains_key(key))
        .is_some_and(|branch| {
            let body = branch.end()..branch.end() + branch.body_text.len();
            body.contains(&index)
        })
}

fn check_markers(template: &Template, warnings: &mut Vec<MergeWarning>) {
    let orphans = template
        .markers()
        .iter()
        .filter(|marker| template.block_at(marker.index).is_none());

    for marker in orphans {
        if marker.kind == MarkerKind::If {
            // Everything after an unterminated `{#if}` belongs to it.
            warnings.push(MergeWarning::UnterminatedBlock {
                key: marker.key.clone(),
                index: marker.index,
                length: marker.length,
            });
            break;
        }
        warnings.push(MergeWarning::StrayMarker {
            marker: marker.kind,
            index: marker.index,
            length: marker.length,
        });
    }
}

fn check_transforms(
    template: &Template,
    transforms: &TransformRegistry,
    warnings: &mut Vec<MergeWarning>,
) {
    for token in template.filters().iter().chain(template.formats()) {
        let (Some(kind), Some(name)) = (TransformKind::of(token.kind), token.transform.as_deref())
        else {
            continue;
        };
        if !transforms.has_transform(kind, name) {
            warnings.push(MergeWarning::UnknownTransform {
                kind,
                name: name.to_string(),
                index: token.index,
                length: token.length,
            });
        }
    }
}
