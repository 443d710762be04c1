//! Mail-merge template engine.
//!
//! A template holds `{key}` variables, `{key|filter:NAME}` and
//! `{key|format:NAME}` directives, and `{#if KEY}` ... `{#else if KEY}` ...
//! `{#else}` ... `{#end if}` blocks. Compiling it once yields a [`Template`]
//! that merges against any number of [`DataRecord`]s.

pub mod engine;
pub mod parser;
pub mod types;

pub use engine::{
    DataSource, DirectorySink, MemorySink, MergeConfig, MergeContext, MergeDriver, MergeError,
    MergeReport, MergeWarning, Merged, OutputSink, RecordOutcome, ReportEntry, TransformKind,
    TransformRegistry, compute_suggestions, resolve,
};
pub use parser::{RecordError, parse_record};
pub use types::{DataRecord, Template};

/// Creates a [`DataRecord`] from key-value pairs.
///
/// Keys and values are converted via `Into<String>`.
///
/// # Example
///
/// ```
/// use mailmerge::record;
///
/// let r = record! { "name" => "Alice", "city" => "Paris" };
/// assert_eq!(r.len(), 2);
/// assert_eq!(r.get("city"), Some("Paris"));
/// ```
#[macro_export]
macro_rules! record {
    {} => {
        $crate::DataRecord::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut record = $crate::DataRecord::new();
            $(
                record.insert($key, $value);
            )+
            record
        }
    };
}
