//! User-facing write and read paths of the storefront.
//!
//! Every mutation goes through the [`DualWriteCoordinator`]. Favourites are
//! the only gated records; the bag, orders, addresses and cards always
//! attempt both stores. Addresses, cards and promotions are listed from the
//! backend only, so their reads surface remote failures directly.
//!
//! Everything except promotions belongs to the signed-in user and is stored
//! under that user's collections; without a user those operations fail with
//! `InvalidRequest`.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;
use uuid::Uuid;

use super::ports::{CardCipher, LocalStore, RemoteStore};
use super::{
    Address, CartItem, Collection, CollectionPath, DualWriteCoordinator, EntityKey, Error,
    Favorite, Order, Outcome, PaymentCard, Promo, StoredCard, SyncableEntity, UserId, WriteGate,
    combine_all, decode_all,
};

/// Storefront operations over both stores.
pub struct StorefrontSyncService<L, R, C> {
    writes: DualWriteCoordinator<L, R>,
    cipher: Arc<C>,
    user_id: Option<UserId>,
}

impl<L, R, C> Clone for StorefrontSyncService<L, R, C> {
    fn clone(&self) -> Self {
        Self {
            writes: self.writes.clone(),
            cipher: Arc::clone(&self.cipher),
            user_id: self.user_id.clone(),
        }
    }
}

impl<L, R, C> StorefrontSyncService<L, R, C>
where
    L: LocalStore,
    R: RemoteStore,
    C: CardCipher,
{
    /// Create a service sharing the session's coordinator, acting for
    /// `user_id` when someone is signed in.
    pub fn new(
        writes: DualWriteCoordinator<L, R>,
        cipher: Arc<C>,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            writes,
            cipher,
            user_id,
        }
    }

    /// Signed-in user the records belong to.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Mark a product as favourite. Refused while offline.
    pub async fn add_favorite(&self, favorite: &Favorite) -> Outcome<()> {
        self.put(WriteGate::RequiresNetwork, favorite).await
    }

    /// Unmark a favourite. Refused while offline.
    pub async fn remove_favorite(&self, favorite: &Favorite) -> Outcome<()> {
        self.writes
            .delete(
                WriteGate::RequiresNetwork,
                &self.path(Collection::Favorites)?,
                &favorite.key(),
            )
            .await
    }

    /// Add a line to the bag.
    pub async fn add_to_cart(&self, item: &CartItem) -> Outcome<()> {
        self.put(WriteGate::Ungated, item).await
    }

    /// Replace a bag line, typically after a quantity change.
    pub async fn update_cart_item(&self, item: &CartItem) -> Outcome<()> {
        self.put(WriteGate::Ungated, item).await
    }

    /// Remove one line from the bag.
    pub async fn remove_cart_item(&self, item: &CartItem) -> Outcome<()> {
        self.writes
            .delete(WriteGate::Ungated, &self.path(Collection::Cart)?, &item.key())
            .await
    }

    /// Remove every line from this user's bag in both stores.
    pub async fn empty_cart(&self) -> Outcome<()> {
        self.writes
            .clear(WriteGate::Ungated, &self.path(Collection::Cart)?)
            .await
    }

    /// Put every line of a past order back into the bag.
    ///
    /// Lines are written concurrently. The result is `Ok` only if every line
    /// reached both stores; otherwise it carries the first failing line's
    /// error in order-line order. Lines that did commit are kept.
    pub async fn restore_cart(&self, order: &Order) -> Outcome<()> {
        debug!(order_id = %order.id, lines = order.lines.len(), "restoring bag from order");
        let outcomes = join_all(
            order
                .lines
                .iter()
                .map(|line| self.put(WriteGate::Ungated, line)),
        )
        .await;
        combine_all(outcomes)
    }

    /// Record a placed order.
    pub async fn place_order(&self, order: &Order) -> Outcome<()> {
        self.put(WriteGate::Ungated, order).await
    }

    /// Forget an order.
    pub async fn remove_order(&self, order_id: &Uuid) -> Outcome<()> {
        self.writes
            .delete(
                WriteGate::Ungated,
                &self.path(Collection::Orders)?,
                &EntityKey::from(order_id),
            )
            .await
    }

    /// Save a new shipping address.
    pub async fn add_address(&self, address: &Address) -> Outcome<()> {
        self.put(WriteGate::Ungated, address).await
    }

    /// Replace an existing shipping address.
    pub async fn update_address(&self, address: &Address) -> Outcome<()> {
        self.put(WriteGate::Ungated, address).await
    }

    /// Delete a shipping address.
    pub async fn remove_address(&self, address_id: &Uuid) -> Outcome<()> {
        self.writes
            .delete(
                WriteGate::Ungated,
                &self.path(Collection::Addresses)?,
                &EntityKey::from(address_id),
            )
            .await
    }

    /// Addresses as held by the backend.
    pub async fn list_addresses(&self) -> Outcome<Vec<Address>> {
        self.remote_all::<Address>().await
    }

    /// Encrypt `card` and store the ciphertext in both stores.
    ///
    /// A cipher failure is returned before either store is touched.
    pub async fn add_card(&self, card: &PaymentCard) -> Outcome<()> {
        let payload = self.cipher.encrypt(card).map_err(Error::from)?;
        let stored = StoredCard {
            id: card.id,
            payload,
        };
        self.put(WriteGate::Ungated, &stored).await
    }

    /// Delete a stored card.
    pub async fn remove_card(&self, card_id: &Uuid) -> Outcome<()> {
        self.writes
            .delete(
                WriteGate::Ungated,
                &self.path(Collection::Cards)?,
                &EntityKey::from(card_id),
            )
            .await
    }

    /// Cards held by the backend, decrypted.
    ///
    /// Any payload that fails to decrypt fails the whole listing.
    pub async fn list_cards(&self) -> Outcome<Vec<PaymentCard>> {
        let stored = self.remote_all::<StoredCard>().await?;
        stored
            .iter()
            .map(|card| self.cipher.decrypt(&card.payload).map_err(Error::from))
            .collect()
    }

    /// Promotions currently offered by the backend.
    pub async fn list_promos(&self) -> Outcome<Vec<Promo>> {
        self.remote_all::<Promo>().await
    }

    /// Favourites as currently cached on the device.
    pub async fn favorites(&self) -> Outcome<Vec<Favorite>> {
        self.local_all::<Favorite>().await
    }

    /// Bag lines as currently cached on the device.
    pub async fn cart(&self) -> Outcome<Vec<CartItem>> {
        self.local_all::<CartItem>().await
    }

    /// Orders as currently cached on the device.
    pub async fn orders(&self) -> Outcome<Vec<Order>> {
        self.local_all::<Order>().await
    }

    fn path(&self, collection: Collection) -> Outcome<CollectionPath> {
        CollectionPath::new(collection, self.user_id.as_ref())
    }

    async fn put<T: SyncableEntity>(&self, gate: WriteGate, entity: &T) -> Outcome<()> {
        self.writes.put(gate, self.user_id.as_ref(), entity).await
    }

    async fn remote_all<T: SyncableEntity>(&self) -> Outcome<Vec<T>> {
        let path = self.path(T::COLLECTION)?;
        let documents = self
            .writes
            .remote()
            .get_all(&path)
            .await
            .map_err(Error::from)?;
        decode_all(documents)
    }

    async fn local_all<T: SyncableEntity>(&self) -> Outcome<Vec<T>> {
        let path = self.path(T::COLLECTION)?;
        let documents = self
            .writes
            .local()
            .get_all(&path)
            .await
            .map_err(Error::from)?;
        decode_all(documents)
    }
}

#[cfg(test)]
#[path = "storefront_service_tests.rs"]
mod tests;
