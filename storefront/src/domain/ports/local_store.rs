//! Port for the on-device document cache.
//!
//! The local store mirrors whatever the device has seen of the backend. It
//! holds JSON documents keyed by `(CollectionPath, EntityKey)` and must tolerate
//! concurrent calls on disjoint keys.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CollectionPath, EntityKey};

use super::define_port_error;

define_port_error! {
    /// Errors raised by local cache adapters.
    pub enum LocalStoreError => LocalFailure {
        /// Reading or writing the underlying medium failed.
        Io { message: String } => "local store I/O failed: {message}",
        /// A stored document could not be parsed.
        Corrupt { message: String } => "local store document is corrupt: {message}",
    }
}

/// Document cache living on the device.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Fetch one document, or `None` when the key has never been stored.
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, LocalStoreError>;

    /// Fetch every document of a collection. An empty collection yields an
    /// empty vector.
    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, LocalStoreError>;

    /// Insert or replace one document.
    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), LocalStoreError>;

    /// Insert or replace a batch of documents.
    ///
    /// Used by cache refreshes; adapters may stop at the first failure.
    async fn put_all(
        &self,
        path: &CollectionPath,
        documents: &[(EntityKey, Value)],
    ) -> Result<(), LocalStoreError>;

    /// Remove one document. Removing an absent key succeeds.
    async fn delete(&self, path: &CollectionPath, key: &EntityKey) -> Result<(), LocalStoreError>;

    /// Remove every document of a collection.
    async fn clear(&self, path: &CollectionPath) -> Result<(), LocalStoreError>;
}
