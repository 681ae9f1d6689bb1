//! The [`RecordStore`]: an insertion-ordered, uniquely-keyed collection that
//! mirrors itself to a snapshot and narrates every mutation to a change log.
//!
//! Every successful mutation rewrites the whole snapshot and appends one log
//! line. Failures of either write are reported in the returned [`Durability`]
//! and never roll back the in-memory change.

use std::fmt;
use std::io;

use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::file::{FileChangeLog, FileSnapshot};
use crate::record::{FieldChange, Record, RecordPatch};
use crate::snapshot::{self, SkippedEntry, SnapshotLayout};
use crate::traits::{ChangeLog, SnapshotBackend};

/// Whether the snapshot rewrite and the log append of a mutation succeeded.
#[derive(Debug, Default)]
pub struct Durability {
    /// Set when the snapshot rewrite failed.
    pub snapshot: Option<StoreError>,
    /// Set when the change-log append failed.
    pub log: Option<StoreError>,
}

impl Durability {
    /// Both writes succeeded.
    pub fn is_durable(&self) -> bool {
        self.snapshot.is_none() && self.log.is_none()
    }

    /// The errors of the writes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &StoreError> {
        self.snapshot.iter().chain(self.log.iter())
    }
}

/// Outcome of an [`RecordStore::update`].
#[derive(Debug)]
pub enum Update {
    /// Nothing was supplied or nothing differed; storage was not touched.
    Unchanged,
    /// At least one field changed; the store was persisted and logged.
    Changed {
        changes: Vec<FieldChange>,
        durability: Durability,
    },
}

impl Update {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Result of [`RecordStore::list_all`]. An empty store is its own state.
#[derive(Debug)]
pub enum Listing<'a, R> {
    Empty,
    Records(&'a [R]),
}

/// How the store was hydrated.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were read from an existing snapshot.
    Loaded(SnapshotLayout),
    /// No snapshot existed; an empty one was written.
    Created,
    /// The snapshot was unusable as a whole; the store was reset and re-saved.
    Reset { reason: String },
    /// The snapshot could not be read; the store is empty for this session
    /// and the file is never written by it (see [`RecordStore::is_writable`]).
    Unavailable { reason: String },
}

/// What [`RecordStore::load`] did.
#[derive(Debug)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    pub loaded: usize,
    pub skipped: Vec<SkippedEntry>,
    /// Set when writing the fresh snapshot after `Created`/`Reset` failed.
    pub save_error: Option<StoreError>,
}

/// An in-memory, uniquely-keyed record collection with snapshot persistence
/// and a change log.
pub struct RecordStore<R: Record> {
    records: Vec<R>,
    snapshot: Box<dyn SnapshotBackend>,
    log: Box<dyn ChangeLog>,
    /// False after a load that could not read the snapshot.
    writable: bool,
}

impl<R: Record> fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("kind", &R::KIND)
            .field("records", &self.records.len())
            .field("snapshot", &self.snapshot.location())
            .field("writable", &self.writable)
            .finish()
    }
}

impl<R: Record> RecordStore<R> {
    /// Open a store over the given backends and hydrate it from the snapshot.
    pub fn open(
        snapshot: impl SnapshotBackend + 'static,
        log: impl ChangeLog + 'static,
    ) -> (Self, LoadReport) {
        let mut store = Self {
            records: Vec::new(),
            snapshot: Box::new(snapshot),
            log: Box::new(log),
            writable: true,
        };
        let report = store.load();
        (store, report)
    }

    /// Open a store backed by the files named in `config`.
    pub fn open_files(config: &StoreConfig) -> (Self, LoadReport) {
        Self::open(
            FileSnapshot::new(&config.snapshot_path),
            FileChangeLog::new(&config.log_path),
        )
    }

    /// Replace the in-memory contents with the snapshot's.
    ///
    /// Never fails: every problem is folded into the returned report and
    /// leaves the store in a usable (possibly empty) state.
    pub fn load(&mut self) -> LoadReport {
        self.records.clear();
        self.writable = true;
        let location = self.snapshot.location();

        let text = match self.snapshot.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                info!(kind = R::KIND, %location, "no snapshot found; creating an empty one");
                return self.fresh_snapshot(LoadOutcome::Created);
            }
            Err(e) => {
                warn!(kind = R::KIND, %location, error = %e, "snapshot unreadable; starting empty");
                self.writable = false;
                return LoadReport {
                    outcome: LoadOutcome::Unavailable {
                        reason: e.to_string(),
                    },
                    loaded: 0,
                    skipped: Vec::new(),
                    save_error: None,
                };
            }
        };

        match snapshot::decode::<R>(&text) {
            Ok(decoded) => {
                self.records = decoded.records;
                info!(
                    kind = R::KIND,
                    %location,
                    loaded = self.records.len(),
                    skipped = decoded.skipped.len(),
                    "snapshot loaded"
                );
                LoadReport {
                    outcome: LoadOutcome::Loaded(decoded.layout),
                    loaded: self.records.len(),
                    skipped: decoded.skipped,
                    save_error: None,
                }
            }
            Err(e @ StoreError::UnsupportedVersion { .. }) => {
                warn!(kind = R::KIND, %location, error = %e, "snapshot left untouched");
                self.writable = false;
                LoadReport {
                    outcome: LoadOutcome::Unavailable {
                        reason: e.to_string(),
                    },
                    loaded: 0,
                    skipped: Vec::new(),
                    save_error: None,
                }
            }
            Err(e) => {
                warn!(kind = R::KIND, %location, error = %e, "snapshot unusable; resetting");
                self.fresh_snapshot(LoadOutcome::Reset {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn fresh_snapshot(&mut self, outcome: LoadOutcome) -> LoadReport {
        let save_error = self.save().err();
        if let Some(e) = &save_error {
            warn!(kind = R::KIND, error = %e, "could not write empty snapshot");
        }
        LoadReport {
            outcome,
            loaded: 0,
            skipped: Vec::new(),
            save_error,
        }
    }

    /// Rewrite the snapshot with every record in store order.
    ///
    /// Fails with `StorageUnavailable` while the store is not writable, so a
    /// snapshot this session could not read is never replaced.
    pub fn save(&self) -> StoreResult<()> {
        if !self.writable {
            return Err(StoreError::storage(
                self.snapshot.location(),
                io::Error::other("snapshot was not loaded in this session; left untouched"),
            ));
        }
        let text = snapshot::encode(&self.records)?;
        self.snapshot.write(&text)
    }

    /// Add a record. Rejects a key that is already present.
    pub fn insert(&mut self, mut record: R) -> StoreResult<Durability> {
        if self.contains(record.key()) {
            return Err(StoreError::DuplicateKey {
                kind: R::KIND,
                key: record.key().to_string(),
            });
        }
        record.refresh_derived();
        record.validate().map_err(StoreError::MalformedInput)?;

        let line = format!(
            "{} agregado: ID={}, {}",
            R::KIND,
            record.key(),
            record.describe()
        );
        debug!(kind = R::KIND, key = %record.key(), "record inserted");
        self.records.push(record);
        Ok(self.commit(&line))
    }

    /// Remove a record by key and return it.
    pub fn remove(&mut self, key: &R::Key) -> StoreResult<(R, Durability)> {
        let index = self.position(key)?;
        let removed = self.records.remove(index);

        debug!(kind = R::KIND, %key, "record removed");
        let durability = self.commit(&format!("{} eliminado: ID={}", R::KIND, key));
        Ok((removed, durability))
    }

    /// Apply a partial update to the record with `key`.
    ///
    /// An empty patch, or one whose values all match the current ones, is a
    /// no-op that touches neither the snapshot nor the log. A patch that
    /// leaves the record invalid is undone and reported as `MalformedInput`.
    pub fn update(&mut self, key: &R::Key, patch: &R::Patch) -> StoreResult<Update> {
        let index = self.position(key)?;
        if patch.is_empty() {
            return Ok(Update::Unchanged);
        }

        let record = &mut self.records[index];
        let before = record.clone();
        let changes = record.apply(patch);
        record.refresh_derived();
        if let Err(reason) = record.validate() {
            *record = before;
            return Err(StoreError::MalformedInput(reason));
        }
        if changes.is_empty() {
            return Ok(Update::Unchanged);
        }

        let rendered: Vec<String> = changes.iter().map(ToString::to_string).collect();
        let line = format!(
            "{} actualizado: ID={}, {}",
            R::KIND,
            key,
            rendered.join(", ")
        );
        debug!(kind = R::KIND, %key, changed = changes.len(), "record updated");
        let durability = self.commit(&line);
        Ok(Update::Changed {
            changes,
            durability,
        })
    }

    /// Records whose `field` contains `needle`, ignoring case, in store order.
    pub fn find_by(&self, field: R::Field, needle: &str) -> Vec<&R> {
        let needle = needle.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.text(field).to_lowercase().contains(&needle))
            .collect()
    }

    /// All records in store order, or [`Listing::Empty`].
    pub fn list_all(&self) -> Listing<'_, R> {
        if self.records.is_empty() {
            Listing::Empty
        } else {
            Listing::Records(&self.records)
        }
    }

    /// All records in store order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.records.iter().find(|r| r.key() == key)
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether this session owns the snapshot. False after a load that ended
    /// in [`LoadOutcome::Unavailable`]; mutations then stay in memory and
    /// report the skipped snapshot write in their [`Durability`].
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Flush a final snapshot and release the store.
    ///
    /// A store that is not writable skips the flush and leaves the snapshot
    /// as it found it.
    pub fn close(self) -> StoreResult<()> {
        if !self.writable {
            warn!(
                kind = R::KIND,
                location = %self.snapshot.location(),
                "store closed without flushing; snapshot left untouched"
            );
            return Ok(());
        }
        self.save()?;
        info!(kind = R::KIND, records = self.records.len(), "store closed");
        Ok(())
    }

    fn position(&self, key: &R::Key) -> StoreResult<usize> {
        self.records
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| StoreError::NotFound {
                kind: R::KIND,
                key: key.to_string(),
            })
    }

    fn commit(&self, line: &str) -> Durability {
        let snapshot = self.save().err();
        if let Some(e) = &snapshot {
            warn!(kind = R::KIND, error = %e, "snapshot write failed; change kept in memory");
        }
        let log = self.log.append(line).err();
        if let Some(e) = &log {
            warn!(kind = R::KIND, error = %e, "change log append failed");
        }
        Durability { snapshot, log }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use proptest::prelude::*;

    use super::*;
    use crate::memory::{InMemoryChangeLog, InMemorySnapshot};
    use crate::test_support::{Note, NoteField, NotePatch};

    fn open_memory() -> (RecordStore<Note>, InMemorySnapshot, InMemoryChangeLog) {
        let snap = InMemorySnapshot::new();
        let log = InMemoryChangeLog::new();
        let (store, _) = RecordStore::open(snap.clone(), log.clone());
        (store, snap, log)
    }

    #[test]
    fn missing_snapshot_creates_empty_one() {
        let snap = InMemorySnapshot::new();
        let (store, report) = RecordStore::<Note>::open(snap.clone(), InMemoryChangeLog::new());

        assert_eq!(report.outcome, LoadOutcome::Created);
        assert!(store.is_empty());
        assert_eq!(snap.writes(), 1);
        let decoded = snapshot::decode::<Note>(&snap.contents().unwrap()).unwrap();
        assert!(decoded.records.is_empty());
    }

    #[test]
    fn unparsable_snapshot_resets_and_resaves() {
        let snap = InMemorySnapshot::with_contents("ID del Producto: |1");
        let (store, report) = RecordStore::<Note>::open(snap.clone(), InMemoryChangeLog::new());

        assert!(matches!(report.outcome, LoadOutcome::Reset { .. }));
        assert!(store.is_empty());
        assert!(snapshot::decode::<Note>(&snap.contents().unwrap()).is_ok());
    }

    #[test]
    fn newer_snapshot_is_not_overwritten() {
        let original = r#"{"version": 42, "records": []}"#;
        let snap = InMemorySnapshot::with_contents(original);
        let (store, report) = RecordStore::<Note>::open(snap.clone(), InMemoryChangeLog::new());

        assert!(matches!(report.outcome, LoadOutcome::Unavailable { .. }));
        assert!(store.is_empty());
        assert_eq!(snap.contents().as_deref(), Some(original));
        assert_eq!(snap.writes(), 0);
    }

    #[test]
    fn close_keeps_a_snapshot_it_could_not_read() {
        let original = r#"{"version": 42, "records": [{"id": 1, "title": "keep me"}]}"#;
        let snap = InMemorySnapshot::with_contents(original);
        let (store, report) = RecordStore::<Note>::open(snap.clone(), InMemoryChangeLog::new());

        assert!(matches!(report.outcome, LoadOutcome::Unavailable { .. }));
        assert!(!store.is_writable());
        store.close().unwrap();
        assert_eq!(snap.contents().as_deref(), Some(original));
        assert_eq!(snap.writes(), 0);
    }

    #[test]
    fn mutations_on_unreadable_snapshot_stay_in_memory() {
        let original = r#"{"version": 42, "records": []}"#;
        let snap = InMemorySnapshot::with_contents(original);
        let log = InMemoryChangeLog::new();
        let (mut store, _) = RecordStore::<Note>::open(snap.clone(), log.clone());

        let durability = store.insert(Note::new(7, "draft")).unwrap();
        assert!(matches!(
            durability.snapshot,
            Some(StoreError::StorageUnavailable { .. })
        ));
        assert!(durability.log.is_none());
        assert!(store.contains(&7));
        assert!(store.save().is_err());
        assert_eq!(snap.contents().as_deref(), Some(original));
        assert_eq!(log.lines(), vec!["Nota agregado: ID=7, Titulo=draft".to_string()]);
    }

    #[test]
    fn reload_after_fix_makes_store_writable_again() {
        let snap = InMemorySnapshot::with_contents(r#"{"version": 42, "records": []}"#);
        let (mut store, _) = RecordStore::<Note>::open(snap.clone(), InMemoryChangeLog::new());
        assert!(!store.is_writable());

        snap.set_contents(r#"{"version": 1, "records": [{"id": 1, "title": "back"}]}"#);
        let report = store.load();
        assert!(matches!(report.outcome, LoadOutcome::Loaded(_)));
        assert!(store.is_writable());
        store.close().unwrap();
        assert_eq!(snap.writes(), 1);
    }

    #[test]
    fn unreadable_snapshot_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the snapshot file should be cannot be read as text.
        let config = StoreConfig::new(dir.path(), dir.path().join("log.txt"));
        let (store, report) = RecordStore::<Note>::open_files(&config);

        assert!(matches!(report.outcome, LoadOutcome::Unavailable { .. }));
        assert!(store.is_empty());
        store.close().unwrap();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn load_skips_malformed_entries() {
        let snap = InMemorySnapshot::with_contents(
            r#"[{"id": 1, "title": "ok"}, {"title": "no id"}, {"id": 2, "title": "fine"}]"#,
        );
        let (store, report) = RecordStore::<Note>::open(snap, InMemoryChangeLog::new());

        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].position, 1);
        assert!(store.contains(&1));
        assert!(store.contains(&2));
    }

    #[test]
    fn insert_persists_and_logs() {
        let (mut store, snap, log) = open_memory();
        let durability = store.insert(Note::new(1, "Widget")).unwrap();

        assert!(durability.is_durable());
        assert_eq!(snap.writes(), 2);
        assert_eq!(log.lines(), vec!["Nota agregado: ID=1, Titulo=Widget"]);
    }

    #[test]
    fn duplicate_insert_is_rejected_without_side_effects() {
        let (mut store, snap, log) = open_memory();
        store.insert(Note::new(1, "first")).unwrap();

        let err = store.insert(Note::new(1, "second")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { kind: "Nota", .. }));
        assert_eq!(store.get(&1).unwrap().title, "first");
        assert_eq!(store.len(), 1);
        assert_eq!(snap.writes(), 2);
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn invalid_insert_is_malformed_input() {
        let (mut store, _, log) = open_memory();
        let err = store.insert(Note::new(1, "")).unwrap_err();
        assert!(matches!(err, StoreError::MalformedInput(_)));
        assert!(store.is_empty());
        assert!(log.lines().is_empty());
    }

    #[test]
    fn remove_present_and_absent() {
        let (mut store, _, log) = open_memory();
        store.insert(Note::new(1, "gone soon")).unwrap();

        let (removed, durability) = store.remove(&1).unwrap();
        assert_eq!(removed.title, "gone soon");
        assert!(durability.is_durable());
        assert!(matches!(store.list_all(), Listing::Empty));
        assert_eq!(log.lines()[1], "Nota eliminado: ID=1");

        assert!(matches!(
            store.remove(&1),
            Err(StoreError::NotFound { kind: "Nota", .. })
        ));
        assert_eq!(log.lines().len(), 2);
    }

    #[test]
    fn update_logs_only_changed_fields_and_refreshes_derived() {
        let (mut store, _, log) = open_memory();
        store.insert(Note::new(1, "abc")).unwrap();

        let outcome = store
            .update(&1, &NotePatch { title: Some("abcdef".into()) })
            .unwrap();
        match outcome {
            Update::Changed { changes, durability } => {
                assert_eq!(changes.len(), 1);
                assert!(durability.is_durable());
            }
            Update::Unchanged => panic!("expected a change"),
        }
        assert_eq!(store.get(&1).unwrap().length, 6);
        assert_eq!(log.lines()[1], "Nota actualizado: ID=1, Titulo=abc→abcdef");
    }

    #[test]
    fn empty_patch_touches_nothing() {
        let (mut store, snap, log) = open_memory();
        store.insert(Note::new(1, "abc")).unwrap();
        let writes = snap.writes();

        let outcome = store.update(&1, &NotePatch::default()).unwrap();
        assert!(!outcome.is_changed());
        assert_eq!(snap.writes(), writes);
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn same_values_touch_nothing() {
        let (mut store, snap, log) = open_memory();
        store.insert(Note::new(1, "abc")).unwrap();
        let writes = snap.writes();

        let outcome = store
            .update(&1, &NotePatch { title: Some("abc".into()) })
            .unwrap();
        assert!(!outcome.is_changed());
        assert_eq!(snap.writes(), writes);
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn empty_patch_on_disk_leaves_files_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("notes.json"), dir.path().join("notes.log"));
        let (mut store, _) = RecordStore::<Note>::open_files(&config);
        store.insert(Note::new(1, "abc")).unwrap();

        let snap_before = fs::read_to_string(&config.snapshot_path).unwrap();
        let mtime_before = fs::metadata(&config.snapshot_path).unwrap().modified().unwrap();
        let log_before = fs::read_to_string(&config.log_path).unwrap();

        store.update(&1, &NotePatch::default()).unwrap();

        assert_eq!(fs::read_to_string(&config.snapshot_path).unwrap(), snap_before);
        assert_eq!(
            fs::metadata(&config.snapshot_path).unwrap().modified().unwrap(),
            mtime_before
        );
        assert_eq!(fs::read_to_string(&config.log_path).unwrap(), log_before);
    }

    #[test]
    fn invalid_update_is_rolled_back() {
        let (mut store, _, log) = open_memory();
        store.insert(Note::new(1, "abc")).unwrap();

        let err = store
            .update(&1, &NotePatch { title: Some(String::new()) })
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedInput(_)));
        assert_eq!(store.get(&1).unwrap().title, "abc");
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn update_missing_key_is_not_found() {
        let (mut store, _, _) = open_memory();
        assert!(matches!(
            store.update(&9, &NotePatch::default()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn failed_snapshot_write_keeps_mutation() {
        let (mut store, snap, log) = open_memory();
        snap.fail_writes(true);

        let durability = store.insert(Note::new(1, "kept")).unwrap();
        assert!(!durability.is_durable());
        assert!(matches!(
            durability.snapshot,
            Some(StoreError::StorageUnavailable { .. })
        ));
        assert!(durability.log.is_none());
        assert!(store.contains(&1));
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn failed_log_append_is_reported() {
        let (mut store, _, log) = open_memory();
        log.fail_appends(true);

        let durability = store.insert(Note::new(1, "kept")).unwrap();
        assert!(durability.snapshot.is_none());
        assert_eq!(durability.failures().count(), 1);
        assert!(store.contains(&1));
    }

    #[test]
    fn find_by_is_case_insensitive_and_ordered() {
        let (mut store, _, _) = open_memory();
        store.insert(Note::new(3, "Blue Widget")).unwrap();
        store.insert(Note::new(1, "gadget")).unwrap();
        store.insert(Note::new(2, "WIDGET mini")).unwrap();

        let hits: Vec<u32> = store
            .find_by(NoteField::Title, "widget")
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(hits, vec![3, 2]);
        assert!(store.find_by(NoteField::Title, "sprocket").is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("notes.json"), dir.path().join("notes.log"));
        {
            let (mut store, _) = RecordStore::<Note>::open_files(&config);
            store.insert(Note::new(5, "five")).unwrap();
            store.insert(Note::new(2, "two")).unwrap();
            store.insert(Note::new(9, "nine")).unwrap();
            store.close().unwrap();
        }

        let (reopened, report) = RecordStore::<Note>::open_files(&config);
        assert_eq!(report.outcome, LoadOutcome::Loaded(SnapshotLayout::Versioned));
        let ids: Vec<u32> = reopened.records().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 2, 9]);
        assert_eq!(reopened.get(&2).unwrap().title, "two");
    }

    proptest! {
        #[test]
        fn keys_stay_unique(ids in proptest::collection::vec(0u32..16, 0..40)) {
            let (mut store, _, _) = open_memory();
            let mut seen = std::collections::HashSet::new();

            for (i, id) in ids.iter().enumerate() {
                let result = store.insert(Note::new(*id, &format!("note {i}")));
                if seen.insert(*id) {
                    prop_assert!(result.is_ok());
                } else {
                    let is_duplicate = matches!(result, Err(StoreError::DuplicateKey { .. }));
                    prop_assert!(is_duplicate);
                }
            }

            prop_assert_eq!(store.len(), seen.len());
            for id in &seen {
                let first = ids.iter().position(|x| x == id).unwrap();
                prop_assert_eq!(&store.get(id).unwrap().title, &format!("note {first}"));
            }
        }
    }
}
