use std::fmt;

use serde::{Deserialize, Serialize};
use tally_store::{FieldChange, Record, RecordPatch};

/// A registered library member and the ISBNs they currently hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "id_usuario")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Held ISBNs in borrow order.
    #[serde(rename = "libros_prestados", default)]
    pub held: Vec<String>,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            held: Vec::new(),
        }
    }

    pub fn holds(&self, isbn: &str) -> bool {
        self.held.iter().any(|h| h == isbn)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Nombre: {}, Libros prestados: [{}]",
            self.id,
            self.name,
            self.held.join(", ")
        )
    }
}

/// Partial update for a [`Member`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberPatch {
    pub name: Option<String>,
    /// Replacement list of held ISBNs.
    pub held: Option<Vec<String>>,
}

impl MemberPatch {
    pub fn held(held: Vec<String>) -> Self {
        Self {
            held: Some(held),
            ..Self::default()
        }
    }
}

impl RecordPatch for MemberPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.held.is_none()
    }
}

/// Searchable text fields of a [`Member`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberField {
    Name,
}

impl Record for Member {
    type Key = String;
    type Patch = MemberPatch;
    type Field = MemberField;

    const KIND: &'static str = "Usuario";

    fn key(&self) -> &String {
        &self.id
    }

    fn describe(&self) -> String {
        format!("Nombre={}", self.name)
    }

    fn text(&self, field: MemberField) -> &str {
        match field {
            MemberField::Name => &self.name,
        }
    }

    fn apply(&mut self, patch: &MemberPatch) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        if let Some(name) = &patch.name {
            if let Some(change) = FieldChange::if_changed("Nombre", &self.name, name) {
                changes.push(change);
                self.name = name.clone();
            }
        }
        if let Some(held) = &patch.held {
            if *held != self.held {
                changes.push(FieldChange::new(
                    "Libros",
                    format!("[{}]", self.held.join(", ")),
                    format!("[{}]", held.join(", ")),
                ));
                self.held = held.clone();
            }
        }
        changes
    }

    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("member id must not be empty".into());
        }
        if self.name.trim().is_empty() {
            return Err("member name must not be empty".into());
        }
        Ok(())
    }
}
