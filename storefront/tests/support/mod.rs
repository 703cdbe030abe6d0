//! Shared helpers for storefront integration tests.
//!
//! Integration tests compile as separate crates, so the store doubles used
//! across them live here.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::{Value, json};
use storefront::domain::ports::{
    FixtureCardCipher, FixtureImageUploader, RemoteStore, RemoteStoreError,
};
use storefront::domain::{Collection, CollectionPath, EntityKey, UserId};
use storefront::outbound::InMemoryDocumentStore;
use storefront::{SessionPorts, StorefrontSession};

/// Backend double that can be switched to reject every write.
#[derive(Default)]
pub struct SwitchableRemote {
    pub inner: InMemoryDocumentStore,
    reject_writes: AtomicBool,
}

impl SwitchableRemote {
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), RemoteStoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(RemoteStoreError::rejected(503_u16, "backend in maintenance"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for SwitchableRemote {
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, RemoteStoreError> {
        RemoteStore::get(&self.inner, path, key).await
    }

    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, RemoteStoreError> {
        RemoteStore::get_all(&self.inner, path).await
    }

    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), RemoteStoreError> {
        self.check_write()?;
        RemoteStore::put(&self.inner, path, key, document).await
    }

    async fn delete(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<(), RemoteStoreError> {
        self.check_write()?;
        RemoteStore::delete(&self.inner, path, key).await
    }

    async fn clear(&self, path: &CollectionPath) -> Result<(), RemoteStoreError> {
        self.check_write()?;
        RemoteStore::clear(&self.inner, path).await
    }
}

pub type MemorySession<L, R> = StorefrontSession<L, R, FixtureCardCipher, FixtureImageUploader>;

/// Ports around the given stores with fixture cipher, uploader and clock.
pub fn ports<L, R>(
    local: Arc<L>,
    remote: Arc<R>,
) -> SessionPorts<L, R, FixtureCardCipher, FixtureImageUploader> {
    SessionPorts {
        local,
        remote,
        cipher: Arc::new(FixtureCardCipher),
        uploader: Arc::new(FixtureImageUploader::default()),
        clock: Arc::new(DefaultClock),
    }
}

pub fn key(raw: &str) -> EntityKey {
    EntityKey::new(raw).expect("valid key")
}

pub fn user(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

/// Path of a collection every user reads.
pub fn shared(collection: Collection) -> CollectionPath {
    CollectionPath::shared(collection).expect("shared collection")
}

/// Path of `user`'s copy of `collection`.
pub fn owned(collection: Collection, user_id: &str) -> CollectionPath {
    CollectionPath::of_user(collection, &user(user_id))
}

pub fn product_document(id: &str, category: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Item {id}"),
        "brand": "Acme",
        "categoryName": category,
        "priceCents": 2_500,
    })
}

/// Remote store seeded with a catalog of `ids`.
pub fn remote_catalog(ids: &[(&str, &str)]) -> InMemoryDocumentStore {
    InMemoryDocumentStore::seeded(
        shared(Collection::Products),
        ids.iter()
            .map(|(id, category)| (key(id), product_document(id, category))),
    )
}
