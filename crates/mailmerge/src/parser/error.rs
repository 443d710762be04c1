//! Parse error types.

use thiserror::Error;

/// An error produced while reading a data document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The document contains no `key=value` pairs.
    #[error("data document contains no key/value pairs")]
    Empty,
}
