//! Template and data record parsing.
//!
//! The scanner turns template text into positioned tokens and conditional
//! markers, the assembler groups markers into blocks, and the record parser
//! reads `key=value` data documents.

pub mod ast;
mod blocks;
pub mod error;
mod record;
mod scanner;

pub use ast::*;
pub use blocks::{Assembly, assemble};
pub use error::RecordError;
pub use record::parse_record;
pub use scanner::{Scan, scan};
