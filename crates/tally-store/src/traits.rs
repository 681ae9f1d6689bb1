use crate::error::StoreResult;

/// Where a store's snapshot document lives.
///
/// Implementations must satisfy these invariants:
/// - `write` replaces the whole document; there is no partial update.
/// - A missing snapshot is not an error: `read` returns `Ok(None)`.
/// - No handle is held between calls; each call acquires and releases.
pub trait SnapshotBackend: Send + Sync {
    /// Read the full snapshot document.
    ///
    /// Returns `Ok(None)` if no snapshot has been written yet.
    /// Returns `Err` on any other I/O failure.
    fn read(&self) -> StoreResult<Option<String>>;

    /// Replace the snapshot document with `contents`.
    fn write(&self, contents: &str) -> StoreResult<()>;

    /// Human-readable location, used in log events.
    fn location(&self) -> String;
}

/// Append-only, human-readable audit trail of mutations.
///
/// The store only ever appends; nothing reads the log back.
pub trait ChangeLog: Send + Sync {
    /// Append one line describing a mutation.
    fn append(&self, line: &str) -> StoreResult<()>;
}
