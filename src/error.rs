//! Error types for the session and feed

use thiserror::Error;

/// The key-value service failed, as opposed to a key simply being absent
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage service unavailable")]
    Unavailable,

    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("display name must not be empty")]
    EmptyName,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeedError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("feed has not been loaded yet")]
    NotLoaded,
}

/// What happened to the persisted copy after a local update.
///
/// The local state is never rolled back, so `Unsaved` only means the change
/// may not survive a reload.
#[must_use]
#[derive(Debug)]
pub enum Write {
    Saved,
    Unsaved(StorageError),
    /// Nothing changed, nothing was written
    Skipped,
}

impl Write {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

impl From<Result<(), StorageError>> for Write {
    fn from(result: Result<(), StorageError>) -> Self {
        match result {
            Ok(()) => Self::Saved,
            Err(e) => Self::Unsaved(e),
        }
    }
}
