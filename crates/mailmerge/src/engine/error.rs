//! Error and warning types for merging.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::engine::transforms::TransformKind;
use crate::parser::MarkerKind;

/// Errors that stop one data file, or the whole run, from producing output.
#[derive(Debug, Error)]
pub enum MergeError {
    /// File I/O error when reading a template or data file.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File I/O error when writing a merged document.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory walk failed below an input path.
    #[error("cannot walk '{path}': {message}")]
    Walk { path: PathBuf, message: String },

    /// The data file yields no key/value pairs, so nothing is merged.
    #[error("no data in '{path}'")]
    EmptyRecord { path: PathBuf },

    /// The configured language is not a valid language identifier.
    #[error("invalid language tag '{tag}'")]
    InvalidLanguage { tag: String },
}

/// A problem worth reporting that does not stop the merge.
///
/// Offsets are byte offsets into the template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum MergeWarning {
    /// An `{#else if}`, `{#else}` or `{#end if}` outside any block; kept as
    /// literal text.
    #[error("stray {marker} at byte {index} has no open {{#if}} block")]
    StrayMarker {
        marker: MarkerKind,
        index: usize,
        length: usize,
    },

    /// An `{#if}` never closed by `{#end if}`; the group is kept as literal
    /// text.
    #[error("{{#if {key}}} at byte {index} is never closed by {{#end if}}")]
    UnterminatedBlock {
        key: String,
        index: usize,
        length: usize,
    },

    /// A filter or format name with no registered transform; the value is
    /// used unchanged.
    #[error("unknown {kind} '{name}' at byte {index}, value used unchanged")]
    UnknownTransform {
        kind: TransformKind,
        name: String,
        index: usize,
        length: usize,
    },

    /// A token whose key the record does not define; its raw text stays in
    /// the output.
    #[error("unresolved key '{key}' at byte {index}{}", did_you_mean(.suggestions))]
    UnresolvedKey {
        key: String,
        index: usize,
        length: usize,
        suggestions: Vec<String>,
    },
}

impl MergeWarning {
    /// The template span the warning points at, as `(offset, length)`.
    pub fn span(&self) -> (usize, usize) {
        match self {
            MergeWarning::StrayMarker { index, length, .. }
            | MergeWarning::UnterminatedBlock { index, length, .. }
            | MergeWarning::UnknownTransform { index, length, .. }
            | MergeWarning::UnresolvedKey { index, length, .. } => (*index, *length),
        }
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
