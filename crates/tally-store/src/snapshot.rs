//! Snapshot document encoding.
//!
//! The current layout is a tagged, versioned JSON document:
//!
//! ```text
//! { "version": 1, "kind": "Producto", "records": [ {..}, {..} ] }
//! ```
//!
//! Decoding also accepts two untagged layouts: a bare array of records, and a
//! bare object whose values are records (keyed by record id). Both are
//! rewritten in the versioned layout on the next save.
//!
//! Entries are decoded one at a time so a single bad entry is skipped without
//! losing the rest of the document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::record::Record;

/// Newest snapshot schema version this crate reads and the one it writes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotDocument<'a, R> {
    version: u32,
    kind: &'static str,
    records: &'a [R],
}

#[derive(Deserialize)]
struct VersionedDocument {
    version: u32,
    #[serde(default)]
    kind: Option<String>,
    records: Vec<Value>,
}

/// Which on-disk layout a snapshot was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotLayout {
    Versioned,
    BareArray,
    KeyedObject,
}

/// An entry that was left out while decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Zero-based position of the entry in the document.
    pub position: usize,
    pub reason: String,
}

/// Result of decoding a snapshot document.
#[derive(Debug)]
pub struct Decoded<R> {
    pub records: Vec<R>,
    pub skipped: Vec<SkippedEntry>,
    pub layout: SnapshotLayout,
}

/// Serialize records, in order, into the versioned layout.
pub fn encode<R: Record>(records: &[R]) -> StoreResult<String> {
    let doc = SnapshotDocument {
        version: SNAPSHOT_VERSION,
        kind: R::KIND,
        records,
    };
    serde_json::to_string_pretty(&doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a snapshot document.
///
/// Returns `MalformedInput` when the document as a whole cannot be used
/// (not JSON, or the wrong top-level shape) and `UnsupportedVersion` when it
/// was written by a newer schema. Individual bad entries are reported in
/// [`Decoded::skipped`] instead.
pub fn decode<R: Record>(text: &str) -> StoreResult<Decoded<R>> {
    let root: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::MalformedInput(format!("snapshot is not valid JSON: {e}")))?;

    let (entries, layout) = match root {
        Value::Array(items) => (items, SnapshotLayout::BareArray),
        Value::Object(map) if is_versioned(&map) => {
            let doc: VersionedDocument = serde_json::from_value(Value::Object(map))
                .map_err(|e| StoreError::MalformedInput(format!("bad snapshot header: {e}")))?;
            if doc.version > SNAPSHOT_VERSION {
                return Err(StoreError::UnsupportedVersion {
                    found: doc.version,
                    supported: SNAPSHOT_VERSION,
                });
            }
            if let Some(kind) = doc.kind.as_deref().filter(|k| *k != R::KIND) {
                warn!(expected = R::KIND, found = kind, "snapshot kind mismatch");
            }
            (doc.records, SnapshotLayout::Versioned)
        }
        Value::Object(map) => (map.into_iter().map(|(_, v)| v).collect(), SnapshotLayout::KeyedObject),
        other => {
            return Err(StoreError::MalformedInput(format!(
                "snapshot must be an object or array, found {}",
                json_type(&other)
            )))
        }
    };

    let mut records: Vec<R> = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();

    for (position, entry) in entries.into_iter().enumerate() {
        match decode_entry::<R>(entry, &records) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(kind = R::KIND, position, %reason, "skipping snapshot entry");
                skipped.push(SkippedEntry { position, reason });
            }
        }
    }

    Ok(Decoded {
        records,
        skipped,
        layout,
    })
}

fn decode_entry<R: Record>(entry: Value, accepted: &[R]) -> Result<R, String> {
    let mut record: R = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    record.refresh_derived();
    record.validate()?;
    if accepted.iter().any(|r| r.key() == record.key()) {
        return Err(format!("duplicate key {}", record.key()));
    }
    Ok(record)
}

/// A numeric `version` next to a `records` array. Anything else is read as
/// an object keyed by record id, where "version" may itself be a key.
fn is_versioned(map: &Map<String, Value>) -> bool {
    map.get("version").is_some_and(Value::is_u64)
        && map.get("records").is_some_and(Value::is_array)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
