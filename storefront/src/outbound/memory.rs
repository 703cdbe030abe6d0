//! In-memory document store.
//!
//! Implements both the local and the remote port so a whole session can run
//! without a device cache or a backend. Documents within a collection are
//! returned in key order.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::ports::{LocalStore, LocalStoreError, RemoteStore, RemoteStoreError};
use crate::domain::{CollectionPath, EntityKey};

type Documents = HashMap<CollectionPath, BTreeMap<EntityKey, Value>>;

/// Process-local document store shared by clones of an `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Documents>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `documents` under `path`.
    pub fn seeded<I>(path: CollectionPath, documents: I) -> Self
    where
        I: IntoIterator<Item = (EntityKey, Value)>,
    {
        let mut all = Documents::new();
        all.insert(path, documents.into_iter().collect());
        Self {
            documents: RwLock::new(all),
        }
    }

    /// Number of documents held under `path`.
    pub async fn len(&self, path: &CollectionPath) -> usize {
        self.documents
            .read()
            .await
            .get(path)
            .map_or(0, BTreeMap::len)
    }

    async fn read_one(&self, path: &CollectionPath, key: &EntityKey) -> Option<Value> {
        self.documents
            .read()
            .await
            .get(path)
            .and_then(|documents| documents.get(key))
            .cloned()
    }

    async fn read_all(&self, path: &CollectionPath) -> Vec<Value> {
        self.documents
            .read()
            .await
            .get(path)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn write(&self, path: &CollectionPath, key: &EntityKey, document: &Value) {
        self.documents
            .write()
            .await
            .entry(path.clone())
            .or_default()
            .insert(key.clone(), document.clone());
    }

    async fn remove(&self, path: &CollectionPath, key: &EntityKey) {
        if let Some(documents) = self.documents.write().await.get_mut(path) {
            documents.remove(key);
        }
    }

    async fn remove_all(&self, path: &CollectionPath) {
        self.documents.write().await.remove(path);
    }
}

#[async_trait]
impl LocalStore for InMemoryDocumentStore {
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, LocalStoreError> {
        Ok(self.read_one(path, key).await)
    }

    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, LocalStoreError> {
        Ok(self.read_all(path).await)
    }

    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), LocalStoreError> {
        self.write(path, key, document).await;
        Ok(())
    }

    async fn put_all(
        &self,
        path: &CollectionPath,
        documents: &[(EntityKey, Value)],
    ) -> Result<(), LocalStoreError> {
        let mut all = self.documents.write().await;
        let target = all.entry(path.clone()).or_default();
        for (key, document) in documents {
            target.insert(key.clone(), document.clone());
        }
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, key: &EntityKey) -> Result<(), LocalStoreError> {
        self.remove(path, key).await;
        Ok(())
    }

    async fn clear(&self, path: &CollectionPath) -> Result<(), LocalStoreError> {
        self.remove_all(path).await;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryDocumentStore {
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, RemoteStoreError> {
        Ok(self.read_one(path, key).await)
    }

    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, RemoteStoreError> {
        Ok(self.read_all(path).await)
    }

    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), RemoteStoreError> {
        self.write(path, key, document).await;
        Ok(())
    }

    async fn delete(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<(), RemoteStoreError> {
        self.remove(path, key).await;
        Ok(())
    }

    async fn clear(&self, path: &CollectionPath) -> Result<(), RemoteStoreError> {
        self.remove_all(path).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Collection, UserId};
    use rstest::rstest;
    use serde_json::json;

    fn key(raw: &str) -> EntityKey {
        EntityKey::new(raw).expect("valid key")
    }

    fn owned(collection: Collection, user: &str) -> CollectionPath {
        CollectionPath::of_user(collection, &UserId::new(user).expect("valid user id"))
    }

    #[rstest]
    #[tokio::test]
    async fn documents_are_returned_in_key_order() {
        let store = InMemoryDocumentStore::new();
        let cart = owned(Collection::Cart, "user-1");
        LocalStore::put(&store, &cart, &key("b"), &json!({ "n": 2 }))
            .await
            .expect("put");
        LocalStore::put(&store, &cart, &key("a"), &json!({ "n": 1 }))
            .await
            .expect("put");

        let documents = LocalStore::get_all(&store, &cart).await.expect("get_all");
        assert_eq!(documents, vec![json!({ "n": 1 }), json!({ "n": 2 })]);
    }

    #[rstest]
    #[tokio::test]
    async fn clear_only_affects_one_collection() {
        let orders = owned(Collection::Orders, "user-1");
        let cart = owned(Collection::Cart, "user-1");
        let store =
            InMemoryDocumentStore::seeded(orders.clone(), [(key("o-1"), json!({ "id": "o-1" }))]);
        RemoteStore::put(&store, &cart, &key("c-1"), &json!({}))
            .await
            .expect("put");

        RemoteStore::clear(&store, &cart).await.expect("clear");

        assert_eq!(store.len(&cart).await, 0);
        assert_eq!(store.len(&orders).await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn clear_leaves_other_users_documents() {
        let store = InMemoryDocumentStore::new();
        let alice = owned(Collection::Cart, "alice");
        let bob = owned(Collection::Cart, "bob");
        RemoteStore::put(&store, &alice, &key("sku-1"), &json!({}))
            .await
            .expect("put");

        RemoteStore::clear(&store, &bob).await.expect("clear");

        assert_eq!(store.len(&alice).await, 1);
        assert!(
            RemoteStore::get_all(&store, &bob)
                .await
                .expect("get_all")
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_missing_key_succeeds() {
        let store = InMemoryDocumentStore::new();
        let favorites = owned(Collection::Favorites, "user-1");
        LocalStore::delete(&store, &favorites, &key("nope"))
            .await
            .expect("absent delete");
        assert!(
            LocalStore::get(&store, &favorites, &key("nope"))
                .await
                .expect("get")
                .is_none()
        );
    }
}
