//! Interactive console menus and the Spanish wording they share.

pub mod inventory;
pub mod library;

use std::io::{self, Write};

use colored::Colorize;
use tally_library::LendingError;
use tally_store::{Durability, LoadOutcome, LoadReport, StoreError};

/// What the menu loop should do after an option ran.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Describe how a store was loaded at startup.
pub(crate) fn report_load(out: &mut impl Write, label: &str, report: &LoadReport) -> io::Result<()> {
    match &report.outcome {
        LoadOutcome::Loaded(_) => writeln!(
            out,
            "{} {label}: {} registro(s) cargado(s).",
            "✓".green(),
            report.loaded
        )?,
        LoadOutcome::Created => writeln!(
            out,
            "No se encontró el archivo de {label}. Se creará uno nuevo."
        )?,
        LoadOutcome::Reset { reason } => writeln!(
            out,
            "{} El archivo de {label} estaba dañado y se reinició vacío ({reason}).",
            "!".yellow()
        )?,
        LoadOutcome::Unavailable { reason } => writeln!(
            out,
            "{} No se pudo leer el archivo de {label}; no se modificará y los cambios de esta sesión no se guardarán ({reason}).",
            "✗".red()
        )?,
    }
    for skipped in &report.skipped {
        writeln!(
            out,
            "{} Error al procesar la entrada {} de {label}: {}",
            "!".yellow(),
            skipped.position + 1,
            skipped.reason
        )?;
    }
    if let Some(e) = &report.save_error {
        writeln!(out, "{} No se pudo guardar el archivo de {label}: {e}", "✗".red())?;
    }
    Ok(())
}

/// Warn about any write of a mutation that did not reach disk.
pub(crate) fn report_durability(out: &mut impl Write, durability: &Durability) -> io::Result<()> {
    if let Some(e) = &durability.snapshot {
        writeln!(
            out,
            "{} El cambio se aplicó pero no se pudo guardar: {e}",
            "!".yellow()
        )?;
    }
    if let Some(e) = &durability.log {
        writeln!(
            out,
            "{} El cambio se aplicó pero no se pudo registrar en el log: {e}",
            "!".yellow()
        )?;
    }
    Ok(())
}

/// User-facing wording of a store error.
pub(crate) fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::DuplicateKey { kind, key } => {
            format!("Ya existe un {} con el ID {key}.", kind.to_lowercase())
        }
        StoreError::NotFound { kind, key } => {
            format!("No se encontró ningún {} con el ID {key}.", kind.to_lowercase())
        }
        StoreError::MalformedInput(reason) => format!("Datos no válidos: {reason}"),
        other => format!("Error de almacenamiento: {other}"),
    }
}

/// User-facing wording of a lending error.
pub(crate) fn lending_message(err: &LendingError) -> String {
    match err {
        LendingError::UnknownMember { id } => format!("El usuario {id} no está registrado."),
        LendingError::LimitReached { id, limit } => format!(
            "El usuario {id} ya tiene el máximo de libros prestados ({limit})."
        ),
        LendingError::UnknownBook { isbn } => format!("No existe ningún libro con ISBN {isbn}."),
        LendingError::AlreadyLent { isbn } => {
            format!("El libro {isbn} no está disponible para préstamo.")
        }
        LendingError::NotLent { isbn } => format!("El libro {isbn} no está prestado."),
        LendingError::NotHeld { id, isbn } => {
            format!("El usuario {id} no tiene prestado el libro {isbn}.")
        }
        LendingError::BookOnLoan { isbn } => {
            format!("El libro {isbn} está prestado y no se puede eliminar.")
        }
        LendingError::MemberHasLoans { id, count } => format!(
            "El usuario {id} aún tiene {count} libro(s) prestado(s) y no se puede eliminar."
        ),
        LendingError::Store(e) => store_message(e),
    }
}

pub(crate) fn success(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {message}", "✓".green())
}

pub(crate) fn failure(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {message}", "✗".red())
}

#[cfg(test)]
mod tests {
    use tally_store::{SkippedEntry, SnapshotLayout};

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn load_report_lists_skipped_entries() {
        let report = LoadReport {
            outcome: LoadOutcome::Loaded(SnapshotLayout::BareArray),
            loaded: 2,
            skipped: vec![SkippedEntry {
                position: 1,
                reason: "missing field `id`".into(),
            }],
            save_error: None,
        };
        let text = render(|out| report_load(out, "inventario", &report));
        assert!(text.contains("2 registro(s) cargado(s)"));
        assert!(text.contains("entrada 2 de inventario: missing field `id`"));
    }

    #[test]
    fn created_report_mentions_new_file() {
        let report = LoadReport {
            outcome: LoadOutcome::Created,
            loaded: 0,
            skipped: Vec::new(),
            save_error: None,
        };
        let text = render(|out| report_load(out, "usuarios", &report));
        assert!(text.contains("No se encontró el archivo de usuarios"));
    }

    #[test]
    fn durable_mutation_prints_nothing() {
        let text = render(|out| report_durability(out, &Durability::default()));
        assert!(text.is_empty());
    }

    #[test]
    fn failed_snapshot_write_is_reported() {
        let durability = Durability {
            snapshot: Some(StoreError::Serialization("boom".into())),
            log: None,
        };
        let text = render(|out| report_durability(out, &durability));
        assert!(text.contains("no se pudo guardar"));
        assert!(!text.contains("log"));
    }

    #[test]
    fn messages_name_the_record() {
        let dup = StoreError::DuplicateKey {
            kind: "Producto",
            key: "1".into(),
        };
        assert_eq!(store_message(&dup), "Ya existe un producto con el ID 1.");

        let limit = LendingError::LimitReached {
            id: "u1".into(),
            limit: 3,
        };
        assert!(lending_message(&limit).contains("(3)"));

        let wrapped = LendingError::Store(StoreError::NotFound {
            kind: "Libro",
            key: "978".into(),
        });
        assert_eq!(lending_message(&wrapped), "No se encontró ningún libro con el ID 978.");
    }
}
