use std::fmt;

use serde::{Deserialize, Serialize};
use tally_store::{FieldChange, Record, RecordPatch};

/// A book in the library catalogue, keyed by ISBN.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "prestado", default)]
    pub lent: bool,
}

impl Book {
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            category: category.into(),
            lent: false,
        }
    }

    /// "Prestado" while lent out, otherwise "Disponible".
    pub fn availability(&self) -> &'static str {
        if self.lent {
            "Prestado"
        } else {
            "Disponible"
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Libro: {} por {} [{}] ({}) - {}",
            self.title,
            self.author,
            self.category,
            self.isbn,
            self.availability()
        )
    }
}

/// Partial update for a [`Book`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub lent: Option<bool>,
}

impl BookPatch {
    pub fn lent(lent: bool) -> Self {
        Self {
            lent: Some(lent),
            ..Self::default()
        }
    }
}

impl RecordPatch for BookPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.category.is_none() && self.lent.is_none()
    }
}

/// Searchable text fields of a [`Book`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Category,
}

fn replace_text(
    changes: &mut Vec<FieldChange>,
    label: &'static str,
    slot: &mut String,
    value: Option<&str>,
) {
    if let Some(value) = value {
        if let Some(change) = FieldChange::if_changed(label, &*slot, value) {
            changes.push(change);
            *slot = value.to_string();
        }
    }
}

impl Record for Book {
    type Key = String;
    type Patch = BookPatch;
    type Field = BookField;

    const KIND: &'static str = "Libro";

    fn key(&self) -> &String {
        &self.isbn
    }

    fn describe(&self) -> String {
        format!("Titulo={}, Autor={}", self.title, self.author)
    }

    fn text(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Category => &self.category,
        }
    }

    fn apply(&mut self, patch: &BookPatch) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        replace_text(&mut changes, "Titulo", &mut self.title, patch.title.as_deref());
        replace_text(&mut changes, "Autor", &mut self.author, patch.author.as_deref());
        replace_text(&mut changes, "Categoria", &mut self.category, patch.category.as_deref());
        if let Some(lent) = patch.lent {
            if lent != self.lent {
                changes.push(FieldChange::new("Prestado", self.lent, lent));
                self.lent = lent;
            }
        }
        changes
    }

    fn validate(&self) -> Result<(), String> {
        if self.isbn.trim().is_empty() {
            return Err("ISBN must not be empty".into());
        }
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        Ok(())
    }
}
