use thiserror::Error;

use crate::storage::StorageError;

/// Failure reading or writing one serialized list
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Malformed stored data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error surfaced at the archive/reminder store boundary.
///
/// `message()` is the human-readable text the front end shows; the
/// underlying cause stays available through `source()`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Load {
        context: &'static str,
        #[source]
        source: PersistError,
    },
    #[error("{context}: {source}")]
    Write {
        context: &'static str,
        #[source]
        source: PersistError,
    },
}

impl StoreError {
    pub fn load(context: &'static str, source: PersistError) -> Self {
        StoreError::Load { context, source }
    }

    pub fn write(context: &'static str, source: PersistError) -> Self {
        StoreError::Write { context, source }
    }

    pub fn message(&self) -> &'static str {
        match self {
            StoreError::Load { context, .. } | StoreError::Write { context, .. } => context,
        }
    }
}
