//! Miette diagnostics for template warnings.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![allow(unused_assignments)]

use std::path::Path;

use mailmerge::MergeWarning;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible warning pointing into the template text.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(mail_merge::template), severity(Warning))]
pub struct TemplateDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl TemplateDiagnostic {
    /// Create a diagnostic from a lint warning with template context.
    pub fn from_warning(path: &Path, content: &str, warning: &MergeWarning) -> Self {
        let (offset, length) = warning.span();

        // Clamp to content length to avoid miette panic on out-of-bounds
        let offset = offset.min(content.len());
        let length = length.min(content.len() - offset);

        let help = match warning {
            MergeWarning::StrayMarker { .. } => {
                Some("the marker is kept as literal text; add the matching {#if KEY}".to_string())
            }
            MergeWarning::UnterminatedBlock { .. } => Some(
                "close the block with {#end if}; until then it is kept as literal text".to_string(),
            ),
            MergeWarning::UnknownTransform { .. } => {
                Some("built in: filter lowercase, format date, format phone".to_string())
            }
            MergeWarning::UnresolvedKey { suggestions, .. } if !suggestions.is_empty() => {
                Some(format!("did you mean: {}?", suggestions.join(", ")))
            }
            MergeWarning::UnresolvedKey { .. } => None,
        };

        TemplateDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: (offset, length).into(),
            message: warning.to_string(),
            help,
        }
    }
}
