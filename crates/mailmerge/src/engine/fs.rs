//! Filesystem data sources and output sinks.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::engine::MergeError;

/// One data document and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    pub text: String,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a data file. Invalid UTF-8 is replaced, not rejected.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, MergeError> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|source| MergeError::Read {
            path: path.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self { path, text })
    }

    /// Name of the merged document: the source's final path component.
    pub fn output_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

/// Expand input paths into data files. Directories are walked recursively,
/// entries sorted by name; symlinks are followed. Each walk error is
/// reported in place of the entry it hit.
pub fn collect_data_files(inputs: &[PathBuf]) -> Vec<Result<PathBuf, MergeError>> {
    let mut files = Vec::new();
    for input in inputs {
        let walker = WalkDir::new(input).follow_links(true).sort_by_file_name();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(Ok(entry.into_path())),
                Ok(_) => {}
                Err(err) => files.push(Err(MergeError::Walk {
                    path: err.path().map_or_else(|| input.clone(), Path::to_path_buf),
                    message: err.to_string(),
                })),
            }
        }
    }
    debug!(count = files.len(), "collected data files");
    files
}

/// Read every collected file, keeping failures in place.
pub fn read_sources(
    files: Vec<Result<PathBuf, MergeError>>,
) -> impl Iterator<Item = Result<DataSource, MergeError>> {
    files
        .into_iter()
        .map(|file| file.and_then(DataSource::read))
}

/// Destination for merged documents.
pub trait OutputSink {
    /// Store one merged document under `name`.
    fn write(&mut self, name: &str, contents: &str) -> io::Result<()>;

    /// Where a document named `name` ends up, for reporting.
    fn location(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

/// Writes each document to a file in one directory, creating the
/// directory on first write.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: HashSet<String>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, name: &str, contents: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        if !self.written.insert(name.to_string()) {
            warn!(name, "output written more than once in this run; keeping the last");
        }
        fs::write(self.location(name), contents)
    }

    fn location(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Keeps documents in memory, keyed by name. Used for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents sorted by name.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, name: &str, contents: &str) -> io::Result<()> {
        self.documents.insert(name.to_string(), contents.to_string());
        Ok(())
    }
}
