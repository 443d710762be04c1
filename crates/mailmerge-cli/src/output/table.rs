//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use mailmerge::{MergeReport, RecordOutcome};
use owo_colors::{OwoColorize, Stream};

/// Format the per-file outcomes of a run as a table.
pub fn format_report_table(report: &MergeReport) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Status", "Detail"]);

    for entry in &report.entries {
        let (status, detail) = describe(&entry.outcome);
        table.add_row(vec![entry.source.display().to_string(), status, detail]);
    }

    table
}

/// One-line totals printed under the table.
pub fn format_summary(report: &MergeReport) -> String {
    format!(
        "{} written, {} skipped, {} failed",
        report.written(),
        report.skipped(),
        report.failed()
    )
}

fn describe(outcome: &RecordOutcome) -> (String, String) {
    match outcome {
        RecordOutcome::Written { output, unresolved } if unresolved.is_empty() => (
            "written"
                .if_supports_color(Stream::Stdout, |s| s.green())
                .to_string(),
            output.display().to_string(),
        ),
        RecordOutcome::Written { output, unresolved } => (
            "written"
                .if_supports_color(Stream::Stdout, |s| s.yellow())
                .to_string(),
            format!("{} (unresolved: {})", output.display(), unresolved.join(", ")),
        ),
        RecordOutcome::Skipped { reason } => (
            "skipped"
                .if_supports_color(Stream::Stdout, |s| s.yellow())
                .to_string(),
            reason.clone(),
        ),
        RecordOutcome::Failed { error } => (
            "failed"
                .if_supports_color(Stream::Stdout, |s| s.red())
                .to_string(),
            error.clone(),
        ),
    }
}
