//! Terminal rendering for run results.

pub mod diagnostic;
pub mod table;

pub use diagnostic::TemplateDiagnostic;
