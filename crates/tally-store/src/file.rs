//! File-backed snapshot and change log.
//!
//! [`FileSnapshot`] replaces its file by writing a temporary file in the same
//! directory and renaming it over the target, so an interrupted write never
//! leaves a truncated snapshot behind. [`FileChangeLog`] opens its file in
//! append mode for every line and closes it again.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ChangeLog, SnapshotBackend};

/// Snapshot document stored in a single file.
#[derive(Clone, Debug)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl SnapshotBackend for FileSnapshot {
    fn read(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::storage(&self.path, e)),
        }
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StoreError::storage(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::storage(dir, e))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::storage(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::storage(&self.path, e.error))?;

        debug!(path = %self.path.display(), bytes = contents.len(), "snapshot written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Change log appended to a text file, one timestamped line per mutation.
#[derive(Clone, Debug)]
pub struct FileChangeLog {
    path: PathBuf,
}

impl FileChangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChangeLog for FileChangeLog {
    fn append(&self, line: &str) -> StoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::storage(dir, e))?;
        }
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::storage(&self.path, e))?;
        writeln!(file, "{stamp} {line}").map_err(|e| StoreError::storage(&self.path, e))
    }
}
