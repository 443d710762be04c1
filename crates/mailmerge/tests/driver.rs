//! Tests for running a template over data files.

use std::fs;
use std::path::PathBuf;

use mailmerge::engine::{load_template, run};
use icu_locale_core::LanguageIdentifier;
use mailmerge::{
    DataSource, DirectorySink, MemorySink, MergeConfig, MergeDriver, MergeError, OutputSink,
    RecordOutcome, Template, TransformKind, TransformRegistry, record,
};
use tempfile::TempDir;

const LETTER: &str = "Dear {name},\n{#if balance}Balance: {balance}\n{#end if}Call {phone|format:phone}\n";

fn write_file(dir: &TempDir, relative: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

// =========================================================================
// load_template
// =========================================================================

#[test]
fn load_template_compiles_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "letter.txt", LETTER);

    let template = load_template(&path).unwrap();
    assert_eq!(template.source(), LETTER);
    assert_eq!(template.blocks().len(), 1);
}

#[test]
fn load_template_replaces_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("letter.txt");
    fs::write(&path, b"Hi {name}\xfe").unwrap();

    let template = load_template(&path).unwrap();
    assert_eq!(template.source(), "Hi {name}\u{fffd}");
    assert_eq!(template.merge(&record! { "name" => "Ann" }), "Hi Ann\u{fffd}");
}

#[test]
fn load_template_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");

    let err = load_template(&missing).unwrap_err();
    assert!(matches!(err, MergeError::Read { ref path, .. } if *path == missing));
}

// =========================================================================
// run
// =========================================================================

#[test]
fn run_writes_one_document_per_data_file() {
    let dir = TempDir::new().unwrap();
    let template_path = write_file(&dir, "letter.txt", LETTER);
    write_file(&dir, "data/ann.txt", "name=Ann\nbalance=$5\nphone=18005550100\n");
    write_file(&dir, "data/nested/bob.txt", "'name' = Bob\nphone = none\n");
    let out = dir.path().join("out");

    let config = MergeConfig::builder()
        .template(&template_path)
        .output_dir(&out)
        .inputs(vec![dir.path().join("data")])
        .build();
    let template = load_template(config.template()).unwrap();
    let mut sink = DirectorySink::new(config.output_dir());

    let report = run(&config, &template, &mut sink).unwrap();

    assert_eq!(report.written(), 2);
    assert_eq!(report.failed(), 0);
    assert!(report.template_warnings.is_empty());
    assert!(!report.has_unresolved());

    assert_eq!(
        fs::read_to_string(out.join("ann.txt")).unwrap(),
        "Dear Ann,\nBalance: $5\nCall (800) 555-0100\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("bob.txt")).unwrap(),
        "Dear Bob,\nCall none\n"
    );
}

#[test]
fn empty_data_file_produces_no_output() {
    let dir = TempDir::new().unwrap();
    let template_path = write_file(&dir, "letter.txt", LETTER);
    let empty = write_file(&dir, "data/empty.txt", "  \n\n");
    let out = dir.path().join("out");

    let config = MergeConfig::builder()
        .template(&template_path)
        .output_dir(&out)
        .inputs(vec![empty.clone()])
        .build();
    let template = load_template(config.template()).unwrap();
    let mut sink = DirectorySink::new(config.output_dir());

    let report = run(&config, &template, &mut sink).unwrap();

    assert_eq!(report.written(), 0);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.entries[0].source, empty);
    assert!(!out.join("empty.txt").exists());
}

#[test]
fn missing_input_fails_without_stopping_the_run() {
    let dir = TempDir::new().unwrap();
    let template = Template::compile("Hi {name}");
    let good = write_file(&dir, "good.txt", "name=Zoe");

    let config = MergeConfig::builder()
        .template("unused.txt")
        .output_dir(dir.path().join("out"))
        .inputs(vec![dir.path().join("missing"), good])
        .build();
    let mut sink = MemorySink::new();

    let report = run(&config, &template, &mut sink).unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.written(), 1);
    assert!(matches!(
        report.entries[0].outcome,
        RecordOutcome::Failed { .. }
    ));
    assert_eq!(sink.get("good.txt"), Some("Hi Zoe"));
}

#[test]
fn invalid_language_is_rejected() {
    let config = MergeConfig::builder()
        .template("t.txt")
        .output_dir("out")
        .language("not a language!")
        .build();
    let template = Template::compile("{x|filter:lowercase}");

    let err = run(&config, &template, &mut MemorySink::new()).unwrap_err();
    assert!(matches!(err, MergeError::InvalidLanguage { ref tag } if tag == "not a language!"));
}

#[test]
fn language_reaches_lowercase_filter() {
    let dir = TempDir::new().unwrap();
    let data = write_file(&dir, "city.txt", "city=ISTANBUL");

    let config = MergeConfig::builder()
        .template("t.txt")
        .output_dir("out")
        .inputs(vec![data])
        .language("tr")
        .build();
    let template = Template::compile("{city|filter:lowercase}");
    let mut sink = MemorySink::new();

    run(&config, &template, &mut sink).unwrap();
    assert_eq!(sink.get("city.txt"), Some("ıstanbul"));
}

#[test]
fn report_lists_unresolved_and_template_warnings() {
    let dir = TempDir::new().unwrap();
    let data = write_file(&dir, "a.txt", "nmae=Ann");

    let config = MergeConfig::builder()
        .template("t.txt")
        .output_dir("out")
        .inputs(vec![data])
        .build();
    let template = Template::compile("Hi {name}{b|filter:shout}{#end if}");
    let mut sink = MemorySink::new();

    let report = run(&config, &template, &mut sink).unwrap();

    assert!(report.has_unresolved());
    assert_eq!(report.template_warnings.len(), 2);
    match &report.entries[0].outcome {
        RecordOutcome::Written { unresolved, .. } => {
            assert_eq!(unresolved, &vec!["b".to_string(), "name".to_string()]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(sink.get("a.txt"), Some("Hi {name}{b|filter:shout}{#end if}"));
}

#[test]
fn report_serializes_with_status_tags() {
    let dir = TempDir::new().unwrap();
    let data = write_file(&dir, "a.txt", "name=Ann");
    let config = MergeConfig::builder()
        .template("t.txt")
        .output_dir("out")
        .inputs(vec![data])
        .build();
    let template = Template::compile("Hi {name}");

    let report = run(&config, &template, &mut MemorySink::new()).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["entries"][0]["status"], "written");
    assert_eq!(value["entries"][0]["output"], "a.txt");
    assert_eq!(value["template_warnings"], serde_json::json!([]));
}

// =========================================================================
// MergeDriver
// =========================================================================

#[test]
fn merge_source_empty_record() {
    let template = Template::compile("{a}");
    let driver = MergeDriver::new(&template);

    let err = driver
        .merge_source(&DataSource::new("blank.txt", "\n"))
        .unwrap_err();
    assert!(matches!(err, MergeError::EmptyRecord { .. }));
}

#[test]
fn merge_source_uses_file_name() {
    let template = Template::compile("{a}-{b}");
    let driver = MergeDriver::new(&template);

    let merged = driver
        .merge_source(&DataSource::new("deep/dir/rec.dat", "a=1\nb=2"))
        .unwrap();
    assert_eq!(merged.name, "rec.dat");
    assert_eq!(merged.text, "1-2");
    assert!(merged.warnings.is_empty());
}

#[test]
fn driver_uses_custom_transforms() {
    fn initial(value: &str, _: &LanguageIdentifier) -> String {
        value.chars().take(1).collect()
    }
    let mut transforms = TransformRegistry::new();
    transforms.register(TransformKind::Filter, "initial", initial);

    let template = Template::compile("{first|filter:initial}. {last|filter:lowercase}");
    let driver = MergeDriver::new(&template).with_transforms(transforms);
    assert!(driver.transforms().has_transform(TransformKind::Filter, "initial"));

    let merged = driver
        .merge_source(&DataSource::new("p.txt", "first=Grace\nlast=HOPPER"))
        .unwrap();
    assert_eq!(merged.text, "G. hopper");
}

#[test]
fn driver_run_over_in_memory_sources() {
    let template = Template::compile("{greeting}, {name}!");
    let driver = MergeDriver::new(&template);
    let sources = vec![
        Ok(DataSource::new("one", "greeting=Hello\nname=Ann")),
        Ok(DataSource::new("two", "greeting=Hej\nname=Bo")),
        Ok(DataSource::new("three", "")),
    ];
    let mut sink = MemorySink::new();

    let report = driver.run(sources, &mut sink);

    assert_eq!(report.written(), 2);
    assert_eq!(report.skipped(), 1);
    let docs: Vec<_> = sink.documents().collect();
    assert_eq!(docs, vec![("one", "Hello, Ann!"), ("two", "Hej, Bo!")]);
}

// =========================================================================
// Sinks
// =========================================================================

#[test]
fn directory_sink_creates_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("a/b/c");
    let mut sink = DirectorySink::new(&out);
    assert_eq!(sink.dir(), out.as_path());
    assert!(!out.exists());

    sink.write("doc.txt", "body").unwrap();

    assert_eq!(sink.location("doc.txt"), out.join("doc.txt"));
    assert_eq!(fs::read_to_string(out.join("doc.txt")).unwrap(), "body");
}

#[test]
fn directory_sink_last_write_wins() {
    let dir = TempDir::new().unwrap();
    let mut sink = DirectorySink::new(dir.path());

    sink.write("doc.txt", "first").unwrap();
    sink.write("doc.txt", "second").unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("doc.txt")).unwrap(),
        "second"
    );
}

#[test]
fn data_file_with_invalid_utf8_is_read_lossily() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, b"name=Ann\xff").unwrap();

    let source = DataSource::read(&path).unwrap();
    assert_eq!(source.text, "name=Ann\u{fffd}");
}
