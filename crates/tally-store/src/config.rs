use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File locations for one record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// The snapshot document, rewritten after every mutation.
    pub snapshot_path: PathBuf,
    /// The append-only change log.
    pub log_path: PathBuf,
}

impl StoreConfig {
    pub fn new(snapshot_path: impl Into<PathBuf>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            log_path: log_path.into(),
        }
    }

    /// Resolve relative paths against `base`; absolute paths are kept.
    pub fn resolved_against(&self, base: &Path) -> Self {
        Self {
            snapshot_path: base.join(&self.snapshot_path),
            log_path: base.join(&self.log_path),
        }
    }
}
