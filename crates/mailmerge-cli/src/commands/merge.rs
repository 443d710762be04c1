//! Implementation of the merge command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use mailmerge::engine::{load_template, run};
use mailmerge::{DirectorySink, MemorySink, MergeConfig, MergeError, MergeReport, OutputSink};
use miette::{miette, IntoDiagnostic, Report, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::debug;

use crate::output::table::{format_report_table, format_summary};
use crate::output::TemplateDiagnostic;

/// Arguments for a merge run.
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Template file
    pub template: PathBuf,

    /// Directory merged documents are written to
    pub output_dir: PathBuf,

    /// Data files or directories (searched recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Language for locale-aware filters (e.g., en, tr)
    #[arg(long, default_value = "und")]
    pub lang: String,

    /// Merge without writing; print the documents to stdout
    #[arg(long)]
    pub dry_run: bool,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with a non-zero code if any document has unresolved keys
    #[arg(long)]
    pub strict: bool,
}

/// JSON output: the run report, plus the merged documents on a dry run.
#[derive(Debug, Serialize)]
struct RunJson<'a> {
    #[serde(flatten)]
    report: &'a MergeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<BTreeMap<&'a str, &'a str>>,
}

/// Run a merge and return the process exit code.
pub fn run_merge(args: MergeArgs) -> Result<i32> {
    let config = MergeConfig::builder()
        .template(args.template)
        .output_dir(args.output_dir)
        .inputs(args.inputs)
        .language(args.lang)
        .build();

    let template = match load_template(config.template()) {
        Ok(template) => template,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exitcode::NOINPUT);
        }
    };

    let mut memory = MemorySink::new();
    let mut directory = DirectorySink::new(config.output_dir());
    let sink: &mut dyn OutputSink = if args.dry_run {
        &mut memory
    } else {
        &mut directory
    };

    let report = match run(&config, &template, sink) {
        Ok(report) => report,
        Err(e @ MergeError::InvalidLanguage { .. }) => {
            eprintln!("{}", e);
            return Ok(exitcode::USAGE);
        }
        Err(e) => return Err(miette!("{}", e)),
    };
    debug!(entries = report.entries.len(), "run finished");

    for warning in &report.template_warnings {
        let diagnostic =
            TemplateDiagnostic::from_warning(config.template(), template.source(), warning);
        eprintln!("{:?}", Report::new(diagnostic));
    }

    if args.dry_run && !args.json {
        print_documents(&memory);
    }

    if args.json {
        let output = RunJson {
            report: &report,
            documents: args.dry_run.then(|| memory.documents().collect()),
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        println!("{}", format_report_table(&report));
        println!("{}", format_summary(&report));
    }

    Ok(exit_code(&report, args.strict))
}

fn print_documents(sink: &MemorySink) {
    for (name, text) in sink.documents() {
        println!(
            "{}",
            format!("==> {} <==", name).if_supports_color(Stream::Stdout, |s| s.bold())
        );
        println!("{}", text);
    }
}

fn exit_code(report: &MergeReport, strict: bool) -> i32 {
    if report.failed() > 0 {
        exitcode::IOERR
    } else if strict && report.has_unresolved() {
        exitcode::DATAERR
    } else {
        exitcode::OK
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mailmerge::{RecordOutcome, ReportEntry};

    use super::*;

    fn report_with(outcome: RecordOutcome) -> MergeReport {
        MergeReport {
            template_warnings: Vec::new(),
            entries: vec![ReportEntry {
                source: PathBuf::from("a.txt"),
                outcome,
            }],
        }
    }

    #[test]
    fn failures_map_to_ioerr() {
        let report = report_with(RecordOutcome::Failed {
            error: "boom".to_string(),
        });
        assert_eq!(exit_code(&report, false), exitcode::IOERR);
    }

    #[test]
    fn unresolved_keys_only_fail_when_strict() {
        let report = report_with(RecordOutcome::Written {
            output: PathBuf::from("out/a.txt"),
            unresolved: vec!["name".to_string()],
        });
        assert_eq!(exit_code(&report, false), exitcode::OK);
        assert_eq!(exit_code(&report, true), exitcode::DATAERR);
    }

    #[test]
    fn skipped_records_are_ok() {
        let report = report_with(RecordOutcome::Skipped {
            reason: "no data".to_string(),
        });
        assert_eq!(exit_code(&report, true), exitcode::OK);
    }
}
