//! Output sinks for file mode.
//!
//! A sink accepts each file name at most once per pass.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("`{0}` was already written in this pass")]
    AlreadyWritten(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for rendered units.
pub trait OutputSink {
    fn write(&mut self, file_name: &str, contents: &str) -> Result<(), SinkError>;
}

/// Writes files into a directory, creating it on first use.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    written: BTreeSet<String>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: BTreeSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths written so far, sorted.
    pub fn written(&self) -> Vec<PathBuf> {
        self.written.iter().map(|name| self.root.join(name)).collect()
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, file_name: &str, contents: &str) -> Result<(), SinkError> {
        if self.written.contains(file_name) {
            return Err(SinkError::AlreadyWritten(file_name.to_string()));
        }

        fs::create_dir_all(&self.root).map_err(|source| SinkError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.root.join(file_name);
        fs::write(&path, contents).map_err(|source| SinkError::Io { path, source })?;

        self.written.insert(file_name.to_string());
        Ok(())
    }
}

/// Keeps files in memory. Used by `check` and in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.files.get(file_name).map(String::as_str)
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn into_files(self) -> BTreeMap<String, String> {
        self.files
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, file_name: &str, contents: &str) -> Result<(), SinkError> {
        if self.files.contains_key(file_name) {
            return Err(SinkError::AlreadyWritten(file_name.to_string()));
        }
        self.files
            .insert(file_name.to_string(), contents.to_string());
        Ok(())
    }
}
