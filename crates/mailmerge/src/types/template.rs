use std::convert::Infallible;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::engine::{MergeContext, TransformRegistry, resolve};
use crate::parser::{ConditionalBlock, ConditionalMarker, Token, assemble, scan};
use crate::types::DataRecord;

/// A compiled template: the raw text plus every placeholder found in it.
///
/// Token and marker offsets refer to the raw text and never change after
/// compilation, so one template can be merged against any number of
/// records, from any number of threads.
///
/// # Example
///
/// ```
/// use mailmerge::{Template, record};
///
/// let template = Template::compile("Dear {name},{#if vip} thank you!{#end if}");
/// assert_eq!(template.variables().len(), 1);
/// assert_eq!(template.blocks().len(), 1);
///
/// let merged = template.merge(&record! { "name" => "Ann", "vip" => "yes" });
/// assert_eq!(merged, "Dear Ann, thank you!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    source: String,
    variables: Vec<Token>,
    filters: Vec<Token>,
    formats: Vec<Token>,
    markers: Vec<ConditionalMarker>,
    blocks: Vec<ConditionalBlock>,
}

impl Template {
    /// Scan and assemble template text. Never fails; malformed placeholders
    /// are kept as literal text.
    pub fn compile(source: impl Into<String>) -> Self {
        let source = source.into();
        let found = scan(&source);
        let assembly = assemble(&source, found.markers);

        debug!(
            variables = found.variables.len(),
            filters = found.filters.len(),
            formats = found.formats.len(),
            markers = assembly.markers.len(),
            blocks = assembly.blocks.len(),
            "compiled template"
        );

        Self {
            source,
            variables: found.variables,
            filters: found.filters,
            formats: found.formats,
            markers: assembly.markers,
            blocks: assembly.blocks,
        }
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn variables(&self) -> &[Token] {
        &self.variables
    }

    pub fn filters(&self) -> &[Token] {
        &self.filters
    }

    pub fn formats(&self) -> &[Token] {
        &self.formats
    }

    /// Every conditional marker, including ones that belong to no block.
    pub fn markers(&self) -> &[ConditionalMarker] {
        &self.markers
    }

    pub fn blocks(&self) -> &[ConditionalBlock] {
        &self.blocks
    }

    /// All substitution tokens in resolution order: variables, then
    /// filters, then formats, each by ascending offset.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.variables
            .iter()
            .chain(&self.filters)
            .chain(&self.formats)
    }

    /// The block whose span contains `index`, if any.
    pub fn block_at(&self, index: usize) -> Option<&ConditionalBlock> {
        self.blocks.iter().find(|block| block.contains(index))
    }

    /// Merge one record using the built-in transforms.
    pub fn merge(&self, record: &DataRecord) -> String {
        let transforms = TransformRegistry::new();
        resolve(self, &MergeContext::new(record, &transforms))
    }
}

impl FromStr for Template {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::compile(s))
    }
}
