//! Transform registry for filters and formats.
//!
//! Filters and formats are plain functions from the record value to the
//! replacement text. Names are matched case-insensitively. A name with no
//! registered transform leaves the value unchanged.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use icu_casemap::CaseMapper;
use icu_locale_core::LanguageIdentifier;
use serde::Serialize;

use crate::parser::TokenKind;

/// Transform function signature.
///
/// Takes the record value and the language used for locale-aware case
/// mapping, and returns the replacement text.
pub type TransformFn = fn(&str, &LanguageIdentifier) -> String;

/// Which directive a transform is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Filter,
    Format,
}

impl TransformKind {
    /// The transform kind a token applies, if it is a directive.
    pub fn of(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Variable => None,
            TokenKind::Filter => Some(TransformKind::Filter),
            TokenKind::Format => Some(TransformKind::Format),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Filter => f.write_str("filter"),
            TransformKind::Format => f.write_str("format"),
        }
    }
}

/// Rendered by the `date` format for values that are not a usable
/// millisecond timestamp.
pub const INVALID_DATE: &str = "Invalid Date";

/// Largest distance from the epoch, in milliseconds, the `date` format
/// accepts (100,000,000 days).
const MAX_EPOCH_MILLIS: i64 = 8_640_000_000_000_000;

/// Length of a 400-year Gregorian cycle (146,097 days) in milliseconds. The
/// calendar and the weekdays repeat exactly after one cycle.
const GREGORIAN_CYCLE_MILLIS: i64 = 146_097 * 86_400_000;

/// Registry of filter and format functions.
pub struct TransformRegistry {
    filters: HashMap<String, TransformFn>,
    formats: HashMap<String, TransformFn>,
}

impl TransformRegistry {
    /// Create a registry holding the built-in transforms: the `lowercase`
    /// filter and the `date` and `phone` formats.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(TransformKind::Filter, "lowercase", lowercase);
        registry.register(TransformKind::Format, "date", date);
        registry.register(TransformKind::Format, "phone", phone);
        registry
    }

    /// Create a registry with no transforms at all.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
            formats: HashMap::new(),
        }
    }

    /// Register a transform, replacing any existing one with the same name.
    pub fn register(&mut self, kind: TransformKind, name: &str, transform: TransformFn) {
        self.table_mut(kind)
            .insert(name.to_ascii_lowercase(), transform);
    }

    /// Get a transform by kind and name.
    pub fn get(&self, kind: TransformKind, name: &str) -> Option<TransformFn> {
        self.table(kind).get(&name.to_ascii_lowercase()).copied()
    }

    /// Check if a transform exists.
    pub fn has_transform(&self, kind: TransformKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// Apply the named transform, or return `value` unchanged when no such
    /// transform is registered.
    pub fn apply(
        &self,
        kind: TransformKind,
        name: &str,
        value: &str,
        language: &LanguageIdentifier,
    ) -> String {
        match self.get(kind, name) {
            Some(transform) => transform(value, language),
            None => value.to_string(),
        }
    }

    fn table(&self, kind: TransformKind) -> &HashMap<String, TransformFn> {
        match kind {
            TransformKind::Filter => &self.filters,
            TransformKind::Format => &self.formats,
        }
    }

    fn table_mut(&mut self, kind: TransformKind) -> &mut HashMap<String, TransformFn> {
        match kind {
            TransformKind::Filter => &mut self.filters,
            TransformKind::Format => &mut self.formats,
        }
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        let mut formats: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        filters.sort_unstable();
        formats.sort_unstable();
        f.debug_struct("TransformRegistry")
            .field("filters", &filters)
            .field("formats", &formats)
            .finish()
    }
}

// =============================================================================
// Built-in transforms
// =============================================================================

/// `lowercase` filter: full Unicode lower-casing for `language`.
pub fn lowercase(value: &str, language: &LanguageIdentifier) -> String {
    CaseMapper::new()
        .lowercase_to_string(value, language)
        .to_string()
}

/// `date` format: epoch milliseconds rendered as `Www Mmm DD YYYY` in UTC.
///
/// Like an integer prefix parse, leading whitespace and a sign are
/// accepted and anything after the digits is ignored. The year has at least
/// four digits and a `-` only when negative.
pub fn date(value: &str, _language: &LanguageIdentifier) -> String {
    integer_prefix(value)
        .filter(|millis| millis.unsigned_abs() <= MAX_EPOCH_MILLIS.unsigned_abs())
        .and_then(format_date)
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// Formats an in-range instant. chrono stops short of the full range, so
/// the instant is moved into 1970..2370 by whole 400-year cycles and the
/// cycles are added back onto the year.
fn format_date(millis: i64) -> Option<String> {
    let cycles = millis.div_euclid(GREGORIAN_CYCLE_MILLIS);
    let instant =
        DateTime::<Utc>::from_timestamp_millis(millis.rem_euclid(GREGORIAN_CYCLE_MILLIS))?;
    let year = i64::from(instant.year()) + cycles * 400;
    let sign = if year < 0 { "-" } else { "" };
    Some(format!(
        "{}{}{:04}",
        instant.format("%a %b %d "),
        sign,
        year.unsigned_abs()
    ))
}

/// `phone` format: regroups the first run of eleven digits `DDDDDDDDDDD`
/// as `(DDD) DDD-DDDD`, dropping the leading digit. Other text is kept; a
/// value without eleven consecutive digits is returned unchanged.
pub fn phone(value: &str, _language: &LanguageIdentifier) -> String {
    const RUN: usize = 11;
    let Some(start) = value
        .as_bytes()
        .windows(RUN)
        .position(|window| window.iter().all(u8::is_ascii_digit))
    else {
        return value.to_string();
    };

    let digits = &value[start..start + RUN];
    format!(
        "{}({}) {}-{}{}",
        &value[..start],
        &digits[1..4],
        &digits[4..7],
        &digits[7..],
        &value[start + RUN..]
    )
}

/// Parse the leading integer of `value`, ignoring leading whitespace and
/// any text after the digits.
fn integer_prefix(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let magnitude: i64 = unsigned[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_prefix_ignores_trailing_text() {
        assert_eq!(integer_prefix("  42ms"), Some(42));
        assert_eq!(integer_prefix("-7"), Some(-7));
        assert_eq!(integer_prefix("+7"), Some(7));
        assert_eq!(integer_prefix("ms42"), None);
        assert_eq!(integer_prefix(""), None);
        assert_eq!(integer_prefix("-"), None);
    }

    #[test]
    fn registry_names_are_case_insensitive() {
        let registry = TransformRegistry::new();
        assert!(registry.has_transform(TransformKind::Filter, "LowerCase"));
        assert!(registry.has_transform(TransformKind::Format, "DATE"));
        assert!(!registry.has_transform(TransformKind::Filter, "date"));
    }
}
