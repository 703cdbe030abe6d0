//! Network-aware reads of cached collections.
//!
//! Online sessions read the backend and refresh the cache with what came
//! back; offline sessions read the cache as-is. The decision is taken per
//! read from the session's [`NetworkAvailability`]. There is no TTL, no
//! background refresh and no eviction.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::ports::{LocalStore, RemoteStore};
use super::{
    CartItem, CollectionPath, EntityKey, Error, Favorite, NetworkAvailability, Outcome, Product,
    SyncableEntity, decode_all, encode,
};

/// Routes catalog reads between the backend and the local cache.
pub struct CatalogSyncRouter<L, R> {
    local: Arc<L>,
    remote: Arc<R>,
    network: NetworkAvailability,
}

impl<L, R> Clone for CatalogSyncRouter<L, R> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: Arc::clone(&self.remote),
            network: self.network,
        }
    }
}

impl<L, R> CatalogSyncRouter<L, R>
where
    L: LocalStore,
    R: RemoteStore,
{
    /// Build a router for one session.
    pub fn new(local: Arc<L>, remote: Arc<R>, network: NetworkAvailability) -> Self {
        Self {
            local,
            remote,
            network,
        }
    }

    /// Read the full product catalog.
    pub async fn products(&self) -> Outcome<Vec<Product>> {
        self.fetch::<Product>().await
    }

    /// Read every entity of `T`'s shared collection along the session's
    /// data path.
    ///
    /// Online: the backend's answer is returned and written through to the
    /// cache; a failed cache refresh is logged and does not affect the
    /// result. Offline: the cache is returned, possibly stale or empty.
    /// User-scoped collections are rejected with `InvalidRequest`.
    pub async fn fetch<T: SyncableEntity>(&self) -> Outcome<Vec<T>> {
        let path = CollectionPath::shared(T::COLLECTION)?;
        let collection = T::COLLECTION;
        if !self.network.is_available() {
            let documents = self.local.get_all(&path).await.map_err(Error::from)?;
            debug!(
                collection = collection.as_str(),
                count = documents.len(),
                path = "local",
                "served read from cache"
            );
            return decode_all(documents);
        }

        let documents = self.remote.get_all(&path).await.map_err(Error::from)?;
        let entities: Vec<T> = decode_all(documents)?;
        debug!(
            collection = collection.as_str(),
            count = entities.len(),
            path = "remote",
            "served read from backend"
        );
        self.refresh_cache(&path, &entities).await;
        Ok(entities)
    }

    async fn refresh_cache<T: SyncableEntity>(&self, path: &CollectionPath, entities: &[T]) {
        let collection = T::COLLECTION;
        let documents: Result<Vec<(EntityKey, serde_json::Value)>, Error> = entities
            .iter()
            .map(|entity| encode(entity).map(|document| (entity.key(), document)))
            .collect();
        let outcome = match documents {
            Ok(documents) => self
                .local
                .put_all(path, &documents)
                .await
                .map_err(Error::from),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            warn!(
                collection = collection.as_str(),
                error = %err,
                "cache refresh after remote read failed"
            );
        }
    }
}

/// Sorted, de-duplicated category names of `products`.
///
/// # Examples
/// ```
/// use storefront::domain::{Product, ProductId, categories};
///
/// let product = |id: &str, category: &str| Product {
///     id: ProductId::new(id).expect("valid id"),
///     title: id.into(),
///     brand: "Acme".into(),
///     category_name: category.into(),
///     price_cents: 100,
///     sale_percent: None,
///     image_urls: vec![],
///     tags: vec![],
///     number_reviews: 0,
///     review_stars: 0,
/// };
/// let names = categories(&[product("a", "Shoes"), product("b", "Dresses"), product("c", "Shoes")]);
/// assert_eq!(names, ["Dresses", "Shoes"]);
/// ```
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|product| product.category_name.trim())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// A product joined with the user's favourite and bag marks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    /// Catalog entry.
    pub product: Product,
    /// Whether any favourite references the product.
    pub is_favorite: bool,
    /// Whether any bag line references the product.
    pub in_cart: bool,
}

/// Join `products` with `favorites` and `cart`, keeping product order.
pub fn product_listings(
    products: &[Product],
    favorites: &[Favorite],
    cart: &[CartItem],
) -> Vec<ProductListing> {
    products
        .iter()
        .map(|product| ProductListing {
            product: product.clone(),
            is_favorite: favorites
                .iter()
                .any(|favorite| favorite.product_id == product.id),
            in_cart: cart.iter().any(|line| line.product_id == product.id),
        })
        .collect()
}

#[cfg(test)]
#[path = "catalog_router_tests.rs"]
mod tests;
