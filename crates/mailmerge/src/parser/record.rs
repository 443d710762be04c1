//! Data record parser.
//!
//! A data document is read as alternating key and value fields, where
//! line breaks and `=` both separate fields:
//!
//! ```text
//! name = Alice
//! 'city' = Paris
//! ```

use super::error::RecordError;
use crate::types::DataRecord;

/// Parse a data document into a record.
///
/// Keys are trimmed and lose surrounding single quotes; values are trimmed.
/// Empty fields are skipped when a key is expected, and a trailing key with
/// no value maps to the empty string. When a key repeats, the last
/// occurrence wins.
///
/// # Errors
///
/// Returns [`RecordError::Empty`] if the document yields no keys.
pub fn parse_record(input: &str) -> Result<DataRecord, RecordError> {
    let fields: Vec<&str> = input.split(['\r', '\n', '=']).map(str::trim).collect();
    let mut record = DataRecord::new();

    let mut i = 0;
    while i < fields.len() {
        if fields[i].is_empty() {
            i += 1;
            continue;
        }
        let key = normalize_key(fields[i]);
        let value = fields.get(i + 1).copied().unwrap_or_default();
        if !key.is_empty() {
            record.insert(key, value);
        }
        i += 2;
    }

    if record.is_empty() {
        Err(RecordError::Empty)
    } else {
        Ok(record)
    }
}

/// Strip surrounding single quotes and whitespace from a key field.
fn normalize_key(field: &str) -> &str {
    field.trim_matches('\'').trim()
}
