use std::path::PathBuf;

/// Errors from record store operations.
///
/// `DuplicateKey` and `NotFound` are ordinary business outcomes; callers are
/// expected to match on them and report them, not to treat them as faults.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with this key is already in the store.
    #[error("duplicate key: {kind} {key} already exists")]
    DuplicateKey { kind: &'static str, key: String },

    /// No record with this key is in the store.
    #[error("not found: no {kind} with key {key}")]
    NotFound { kind: &'static str, key: String },

    /// A record (typed by a user or decoded from a snapshot) is invalid.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The snapshot or log file could not be read or written.
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The snapshot was written by a newer schema than this build understands.
    #[error("unsupported snapshot version {found} (newest known: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl StoreError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for the expected outcomes (`DuplicateKey`, `NotFound`).
    pub fn is_business_outcome(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. } | Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
