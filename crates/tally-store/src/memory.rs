//! In-memory snapshot and change log for tests and embedding.
//!
//! Both types are cheap handles over shared state: clone one before handing
//! it to a store and keep the clone to inspect what the store wrote.

use std::io;
use std::sync::{Arc, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ChangeLog, SnapshotBackend};

#[derive(Debug, Default)]
struct SnapshotState {
    contents: Option<String>,
    writes: usize,
    fail_writes: bool,
}

/// Snapshot held in memory. Data is lost when the last handle is dropped.
#[derive(Clone, Debug, Default)]
pub struct InMemorySnapshot {
    state: Arc<RwLock<SnapshotState>>,
}

impl InMemorySnapshot {
    /// Create a backend with no snapshot written yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let snap = Self::new();
        snap.set_contents(contents);
        snap
    }

    /// Replace the stored document as an outside writer would; not counted
    /// in [`writes`](Self::writes).
    pub fn set_contents(&self, contents: impl Into<String>) {
        self.state.write().expect("lock poisoned").contents = Some(contents.into());
    }

    /// Current snapshot document, if any.
    pub fn contents(&self) -> Option<String> {
        self.state.read().expect("lock poisoned").contents.clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.state.read().expect("lock poisoned").writes
    }

    /// Make subsequent writes fail with a permission error.
    pub fn fail_writes(&self, fail: bool) {
        self.state.write().expect("lock poisoned").fail_writes = fail;
    }
}

impl SnapshotBackend for InMemorySnapshot {
    fn read(&self) -> StoreResult<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        if state.fail_writes {
            return Err(StoreError::storage(
                "memory",
                io::Error::new(io::ErrorKind::PermissionDenied, "writes disabled"),
            ));
        }
        state.contents = Some(contents.to_string());
        state.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Change log collected in memory, without timestamps.
#[derive(Clone, Debug, Default)]
pub struct InMemoryChangeLog {
    lines: Arc<RwLock<Vec<String>>>,
    fail: Arc<RwLock<bool>>,
}

impl InMemoryChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines appended so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().expect("lock poisoned").clone()
    }

    /// Make subsequent appends fail with a permission error.
    pub fn fail_appends(&self, fail: bool) {
        *self.fail.write().expect("lock poisoned") = fail;
    }
}

impl ChangeLog for InMemoryChangeLog {
    fn append(&self, line: &str) -> StoreResult<()> {
        if *self.fail.read().expect("lock poisoned") {
            return Err(StoreError::storage(
                "memory",
                io::Error::new(io::ErrorKind::PermissionDenied, "appends disabled"),
            ));
        }
        self.lines
            .write()
            .expect("lock poisoned")
            .push(line.to_string());
        Ok(())
    }
}
