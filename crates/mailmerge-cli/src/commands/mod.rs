//! CLI command implementations.

mod merge;

pub use merge::{run_merge, MergeArgs};
