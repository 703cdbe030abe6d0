//! Port for the authoritative backend.
//!
//! Same document shape as [`super::LocalStore`], over the network. Timeouts
//! and rejections are expected and must surface as errors rather than being
//! swallowed by adapters.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CollectionPath, EntityKey};

use super::define_port_error;

define_port_error! {
    /// Errors raised by backend adapters.
    pub enum RemoteStoreError => RemoteFailure {
        /// The backend could not be reached or timed out.
        Unavailable { message: String } => "remote store unavailable: {message}",
        /// The backend answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "remote store rejected the request with status {status}: {message}",
        /// The backend answered with a body that is not a valid document.
        Decode { message: String } => "remote store response could not be decoded: {message}",
    }
}

/// Authoritative document store reached over the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one document, or `None` when the backend has no such key.
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, RemoteStoreError>;

    /// Fetch every document of a collection.
    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, RemoteStoreError>;

    /// Insert or replace one document.
    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), RemoteStoreError>;

    /// Remove one document.
    async fn delete(&self, path: &CollectionPath, key: &EntityKey)
    -> Result<(), RemoteStoreError>;

    /// Remove every document of a collection.
    async fn clear(&self, path: &CollectionPath) -> Result<(), RemoteStoreError>;
}
