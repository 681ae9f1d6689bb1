//! The [`Record`] trait and the pieces a record type hands back to the store.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A uniquely-keyed, serializable record that can live in a
/// [`RecordStore`](crate::RecordStore).
///
/// Implementors own their field semantics: how a partial update applies, which
/// fields are searchable, and how derived fields are recomputed. The store
/// owns uniqueness, persistence and the change log.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// The unique key. Caller-supplied, never generated by the store.
    type Key: Clone + Eq + fmt::Display + fmt::Debug;

    /// A partial update; each `Some` field overwrites the record's field.
    type Patch: RecordPatch;

    /// The text fields that [`RecordStore::find_by`](crate::RecordStore::find_by)
    /// can match against.
    type Field: Copy + fmt::Debug;

    /// Noun used in change-log lines, e.g. `"Producto"`.
    const KIND: &'static str;

    /// The record's key.
    fn key(&self) -> &Self::Key;

    /// Short `Label=value` summary appended to the insert log line.
    fn describe(&self) -> String;

    /// The text of a searchable field.
    fn text(&self, field: Self::Field) -> &str;

    /// Apply a patch and return the fields whose value actually changed.
    fn apply(&mut self, patch: &Self::Patch) -> Vec<FieldChange>;

    /// Recompute derived fields from the fields they depend on.
    fn refresh_derived(&mut self) {}

    /// Check field-level invariants. The error is a human-readable reason.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A partial update for a [`Record`].
pub trait RecordPatch {
    /// Returns `true` when no field is supplied.
    fn is_empty(&self) -> bool;
}

/// One field that changed during an update, rendered as `Label=old→new`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    pub fn new(field: &'static str, old: impl fmt::Display, new: impl fmt::Display) -> Self {
        Self {
            field,
            old: old.to_string(),
            new: new.to_string(),
        }
    }

    /// Record a change only if the rendered values differ.
    pub fn if_changed(
        field: &'static str,
        old: impl fmt::Display,
        new: impl fmt::Display,
    ) -> Option<Self> {
        let change = Self::new(field, old, new);
        (change.old != change.new).then_some(change)
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}→{}", self.field, self.old, self.new)
    }
}
