//! Named message channels shared by the documents of one origin.

use std::rc::Rc;

use crate::cleanup::Cleanup;
use crate::storage::StorageError;

/// Namespace prepended to the storage key to name its sync channel.
pub const CHANNEL_PREFIX: &str = "themer:";

/// Channel carrying changes of `key`.
#[must_use]
pub fn channel_name(key: &str) -> String {
    format!("{CHANNEL_PREFIX}{key}")
}

/// Message transport between documents, modelled on `BroadcastChannel`.
///
/// One implementor value is one document's endpoint: a posted message reaches
/// the channel's listeners in every other endpoint, never the poster's own.
pub trait Broadcast {
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the channel cannot be opened or the
    /// message cannot be posted.
    fn post(&self, channel: &str, message: &str) -> Result<(), StorageError>;

    /// Listen on `channel` until the returned guard is released.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the channel cannot be opened.
    fn listen(&self, channel: &str, on_message: Rc<dyn Fn(String)>) -> Result<Cleanup, StorageError>;
}
