//! Keyed record storage with whole-file snapshots and a change log.
//!
//! A [`RecordStore`] holds an insertion-ordered collection of records with
//! unique, caller-supplied keys. It is hydrated from a snapshot when opened,
//! and every successful mutation rewrites the snapshot in full and appends one
//! human-readable line to a change log.
//!
//! # Storage Backends
//!
//! Snapshots implement [`SnapshotBackend`], logs implement [`ChangeLog`]:
//!
//! - [`FileSnapshot`] / [`FileChangeLog`] -- files on disk; snapshots are
//!   replaced by write-to-temp-then-rename
//! - [`InMemorySnapshot`] / [`InMemoryChangeLog`] -- shared in-memory state
//!   for tests and embedding
//!
//! # Design Rules
//!
//! 1. Keys are unique at all times; a duplicate insert is rejected, never
//!    overwritten.
//! 2. Derived fields are recomputed on load and on every write.
//! 3. A mutation that changes nothing touches neither snapshot nor log.
//! 4. Persistence failures are reported, never rolled back into memory.
//! 5. No handle to the snapshot or log is held between operations.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use file::{FileChangeLog, FileSnapshot};
pub use memory::{InMemoryChangeLog, InMemorySnapshot};
pub use record::{FieldChange, Record, RecordPatch};
pub use snapshot::{SkippedEntry, SnapshotLayout, SNAPSHOT_VERSION};
pub use store::{Durability, Listing, LoadOutcome, LoadReport, RecordStore, Update};
pub use traits::{ChangeLog, SnapshotBackend};
