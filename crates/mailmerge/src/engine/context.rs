//! Per-merge resolution context.

use icu_locale_core::{LanguageIdentifier, langid};

use crate::engine::transforms::{TransformKind, TransformRegistry};
use crate::parser::Token;
use crate::types::DataRecord;

/// Everything one merge reads: the record, the transforms, and the
/// language for locale-aware filters.
pub struct MergeContext<'a> {
    record: &'a DataRecord,
    transforms: &'a TransformRegistry,
    language: LanguageIdentifier,
}

impl<'a> MergeContext<'a> {
    /// Create a context for the undetermined language (`und`).
    pub fn new(record: &'a DataRecord, transforms: &'a TransformRegistry) -> Self {
        Self {
            record,
            transforms,
            language: langid!("und"),
        }
    }

    /// Use `language` for locale-aware transforms.
    pub fn with_language(mut self, language: LanguageIdentifier) -> Self {
        self.language = language;
        self
    }

    pub fn record(&self) -> &DataRecord {
        self.record
    }

    pub fn language(&self) -> &LanguageIdentifier {
        &self.language
    }

    /// Whether the record defines `key`. Conditions test presence only.
    pub fn is_present(&self, key: &str) -> bool {
        self.record.contains_key(key)
    }

    /// The text that replaces `token`, or `None` when its key is absent.
    pub fn replacement(&self, token: &Token) -> Option<String> {
        let value = self.record.get(&token.key)?;
        let replaced = match (TransformKind::of(token.kind), token.transform.as_deref()) {
            (Some(kind), Some(name)) => self.transforms.apply(kind, name, value, &self.language),
            _ => value.to_string(),
        };
        Some(replaced)
    }
}
