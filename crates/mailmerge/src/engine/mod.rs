//! Merge engine.
//!
//! Resolves compiled templates against data records, applies filter and
//! format transforms, lints templates and records, and drives a template
//! over a set of data files.

mod context;
mod driver;
mod error;
mod fs;
mod lint;
mod splice;
mod transforms;

pub use context::MergeContext;
pub use driver::{
    MergeConfig, MergeDriver, MergeReport, Merged, RecordOutcome, ReportEntry, load_template, run,
};
pub use error::{MergeError, MergeWarning};
pub use fs::{DataSource, DirectorySink, MemorySink, OutputSink, collect_data_files, read_sources};
pub use lint::{check_record, check_template, compute_suggestions};
pub use splice::resolve;
pub use transforms::{
    INVALID_DATE, TransformFn, TransformKind, TransformRegistry, date, lowercase, phone,
};
