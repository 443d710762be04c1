//! Merge driver: one compiled template against many data files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use bon::Builder;
use icu_locale_core::{LanguageIdentifier, langid};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::error::{MergeError, MergeWarning};
use crate::engine::fs::{DataSource, OutputSink, collect_data_files, read_sources};
use crate::engine::lint::{check_record, check_template};
use crate::engine::{MergeContext, TransformRegistry, resolve};
use crate::parser::{RecordError, parse_record};
use crate::types::Template;

/// Settings for one run, fixed once built.
///
/// # Example
///
/// ```
/// use mailmerge::MergeConfig;
///
/// let config = MergeConfig::builder()
///     .template("letter.txt")
///     .output_dir("out")
///     .inputs(vec!["data".into()])
///     .build();
///
/// assert_eq!(config.language(), "und");
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct MergeConfig {
    /// Path of the template file.
    #[builder(into)]
    template: PathBuf,

    /// Directory merged documents are written to.
    #[builder(into)]
    output_dir: PathBuf,

    /// Data files or directories (walked recursively).
    #[builder(default)]
    inputs: Vec<PathBuf>,

    /// Language tag for locale-aware filters.
    #[builder(default = "und".to_string())]
    language: String,
}

impl MergeConfig {
    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Parse the configured language tag.
    pub fn language_id(&self) -> Result<LanguageIdentifier, MergeError> {
        self.language
            .parse()
            .map_err(|_| MergeError::InvalidLanguage {
                tag: self.language.clone(),
            })
    }
}

/// Read and compile a template file. Invalid UTF-8 is replaced, as for
/// data files.
pub fn load_template(path: &Path) -> Result<Template, MergeError> {
    let bytes = fs::read(path).map_err(|source| MergeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Template::compile(String::from_utf8_lossy(&bytes)))
}

/// Merge every data file named by `config` into `sink`.
///
/// Per-file failures are recorded in the report and never abort the run.
pub fn run<S: OutputSink + ?Sized>(
    config: &MergeConfig,
    template: &Template,
    sink: &mut S,
) -> Result<MergeReport, MergeError> {
    let driver = MergeDriver::new(template).with_language(config.language_id()?);
    let files = collect_data_files(config.inputs());
    let mut report = driver.run(read_sources(files), sink);
    report.template_warnings = check_template(template, driver.transforms());
    Ok(report)
}

/// A merged document ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    /// Output name, taken from the data source.
    pub name: String,
    pub text: String,
    /// Unresolved keys left in `text`.
    pub warnings: Vec<MergeWarning>,
}

/// Applies one compiled template to data sources.
#[derive(Debug)]
pub struct MergeDriver<'t> {
    template: &'t Template,
    transforms: TransformRegistry,
    language: LanguageIdentifier,
}

impl<'t> MergeDriver<'t> {
    /// Create a driver with the built-in transforms and the `und` language.
    pub fn new(template: &'t Template) -> Self {
        Self {
            template,
            transforms: TransformRegistry::new(),
            language: langid!("und"),
        }
    }

    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn with_language(mut self, language: LanguageIdentifier) -> Self {
        self.language = language;
        self
    }

    pub fn template(&self) -> &Template {
        self.template
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    /// Merge one data source.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::EmptyRecord`] when the source holds no data;
    /// no document should be written for it.
    pub fn merge_source(&self, source: &DataSource) -> Result<Merged, MergeError> {
        let record = parse_record(&source.text).map_err(|err| match err {
            RecordError::Empty => MergeError::EmptyRecord {
                path: source.path.clone(),
            },
        })?;
        debug!(source = %source.path.display(), keys = record.len(), "merging record");

        let ctx = MergeContext::new(&record, &self.transforms).with_language(self.language.clone());
        Ok(Merged {
            name: source.output_name(),
            text: resolve(self.template, &ctx),
            warnings: check_record(self.template, &record),
        })
    }

    /// Merge every source into `sink`, recording one report entry each.
    pub fn run<S: OutputSink + ?Sized>(
        &self,
        sources: impl IntoIterator<Item = Result<DataSource, MergeError>>,
        sink: &mut S,
    ) -> MergeReport {
        let mut report = MergeReport::default();
        for source in sources {
            let entry = match source {
                Ok(source) => self.merge_into(&source, sink),
                Err(err) => {
                    warn!(%err, "skipping data file");
                    ReportEntry {
                        source: err.path().map(Path::to_path_buf).unwrap_or_default(),
                        outcome: RecordOutcome::Failed {
                            error: err.to_string(),
                        },
                    }
                }
            };
            report.entries.push(entry);
        }
        report
    }

    fn merge_into<S: OutputSink + ?Sized>(&self, source: &DataSource, sink: &mut S) -> ReportEntry {
        let outcome = match self.merge_source(source) {
            Ok(merged) => match sink.write(&merged.name, &merged.text) {
                Ok(()) => {
                    let output = sink.location(&merged.name);
                    info!(output = %output.display(), "wrote merged document");
                    RecordOutcome::Written {
                        output,
                        unresolved: unresolved_keys(&merged.warnings),
                    }
                }
                Err(source) => {
                    let err = MergeError::Write {
                        path: sink.location(&merged.name),
                        source,
                    };
                    warn!(%err, "could not write merged document");
                    RecordOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            },
            Err(err @ MergeError::EmptyRecord { .. }) => {
                warn!(%err, "no output for data file");
                RecordOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
            Err(err) => {
                warn!(%err, "skipping data file");
                RecordOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        ReportEntry {
            source: source.path.clone(),
            outcome,
        }
    }
}

impl MergeError {
    /// The file the error concerns, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            MergeError::Read { path, .. }
            | MergeError::Write { path, .. }
            | MergeError::Walk { path, .. }
            | MergeError::EmptyRecord { path } => Some(path),
            MergeError::InvalidLanguage { .. } => None,
        }
    }
}

fn unresolved_keys(warnings: &[MergeWarning]) -> Vec<String> {
    let keys: BTreeSet<&str> = warnings
        .iter()
        .filter_map(|w| match w {
            MergeWarning::UnresolvedKey { key, .. } => Some(key.as_str()),
            MergeWarning::StrayMarker { .. }
            | MergeWarning::UnterminatedBlock { .. }
            | MergeWarning::UnknownTransform { .. } => None,
        })
        .collect();
    keys.into_iter().map(ToString::to_string).collect()
}

// =============================================================================
// Report
// =============================================================================

/// What happened to each data file in a run.
#[derive(Debug, Default, Serialize)]
pub struct MergeReport {
    /// Problems found in the template itself.
    pub template_warnings: Vec<MergeWarning>,
    pub entries: Vec<ReportEntry>,
}

/// The outcome for one data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// A merged document was written.
    Written {
        output: PathBuf,
        /// Keys left unresolved in the document, sorted.
        unresolved: Vec<String>,
    },
    /// The data file held no data; nothing was written.
    Skipped { reason: String },
    /// Reading the data file or writing its document failed.
    Failed { error: String },
}

impl MergeReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    /// Whether any written document still contains unresolved keys.
    pub fn has_unresolved(&self) -> bool {
        self.entries.iter().any(|e| match &e.outcome {
            RecordOutcome::Written { unresolved, .. } => !unresolved.is_empty(),
            RecordOutcome::Skipped { .. } | RecordOutcome::Failed { .. } => false,
        })
    }

    fn count(&self, predicate: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}
