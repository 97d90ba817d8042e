//! Raw key/value storage areas.

use crate::cleanup::Cleanup;
use crate::storage::ChangeHandler;

/// Failure reported by a storage area or broadcast transport.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backend does not exist in this context (no window, disabled
    /// storage, sandboxed frame).
    #[error("storage backend unavailable")]
    Unavailable,
    /// The backend exists but refused the operation (quota, security error).
    #[error("storage backend rejected the operation: {0}")]
    Backend(String),
}

/// Synchronous key/value area.
pub trait StorageArea {
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the area cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] when the area cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] when the entry cannot be removed.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Native notification of writes made by other documents, if the area
    /// has one.
    fn watch(&self, _key: &str, _on_change: ChangeHandler) -> Option<Cleanup> {
        None
    }
}
