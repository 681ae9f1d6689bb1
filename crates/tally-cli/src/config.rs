use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tally_library::LibraryConfig;
use tally_store::StoreConfig;

/// Top-level configuration, read from an optional TOML file.
///
/// Every field has a default, so an empty file (or no file) yields the
/// stock layout: all data and logs in the working directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Base directory for relative snapshot and log paths.
    pub data_dir: PathBuf,
    pub inventory: StoreConfig,
    pub library: LibraryConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            inventory: StoreConfig::new("inventario.json", "inventario_log.txt"),
            library: LibraryConfig::default(),
        }
    }
}

impl TallyConfig {
    /// Read the configuration file, or return defaults when none is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A copy with every store path resolved against `data_dir`.
    pub fn resolved(&self) -> Self {
        let base = self.data_dir.as_path();
        Self {
            data_dir: self.data_dir.clone(),
            inventory: self.inventory.resolved_against(base),
            library: LibraryConfig {
                books: self.library.books.resolved_against(base),
                members: self.library.members.resolved_against(base),
                loan_limit: self.library.loan_limit,
            },
        }
    }
}
