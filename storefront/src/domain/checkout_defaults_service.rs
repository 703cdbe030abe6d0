//! Default card and address used to pre-fill checkout.
//!
//! The backend stores the selection as one record with no partial-update
//! primitive, so every change re-sends the whole `{card, address}` pair to
//! both stores. The pair the user asked for is remembered for the session
//! even when writing it fails.

use tokio::sync::Mutex;
use tracing::debug;

use super::ports::{LocalStore, RemoteStore};
use super::{
    CheckoutIndices, CheckoutSlot, Collection, CollectionPath, DefaultCheckoutIndex,
    DualWriteCoordinator, EntityKey, Error, Outcome, UserId, WriteGate, decode,
};

/// Tracks and persists one user's default checkout selection.
pub struct CheckoutDefaultsService<L, R> {
    writes: DualWriteCoordinator<L, R>,
    user_id: UserId,
    current: Mutex<CheckoutIndices>,
}

impl<L, R> CheckoutDefaultsService<L, R>
where
    L: LocalStore,
    R: RemoteStore,
{
    /// Create the service for `user_id` with nothing selected yet.
    pub fn new(writes: DualWriteCoordinator<L, R>, user_id: UserId) -> Self {
        Self {
            writes,
            user_id,
            current: Mutex::new(CheckoutIndices::default()),
        }
    }

    /// Selection as last loaded or set in this session.
    pub async fn current(&self) -> CheckoutIndices {
        *self.current.lock().await
    }

    /// Read the selection from the backend.
    ///
    /// A missing record means nothing is selected. Backend errors are
    /// returned as-is; the local mirror is never consulted.
    pub async fn load_defaults(&self) -> Outcome<CheckoutIndices> {
        let document = self
            .writes
            .remote()
            .get(
                &CollectionPath::of_user(Collection::CheckoutDefaults, &self.user_id),
                &EntityKey::from(&self.user_id),
            )
            .await
            .map_err(Error::from)?;
        let indices = match document {
            Some(document) => decode::<DefaultCheckoutIndex>(document)?.indices,
            None => CheckoutIndices::default(),
        };
        *self.current.lock().await = indices;
        Ok(indices)
    }

    /// Select `index` for `slot`, keeping the other slot, and write the
    /// whole pair to both stores.
    pub async fn set_default(&self, slot: CheckoutSlot, index: usize) -> Outcome<CheckoutIndices> {
        let mut current = self.current.lock().await;
        let next = current.with(slot, index);
        *current = next;
        let record = DefaultCheckoutIndex {
            user_id: self.user_id.clone(),
            indices: next,
        };
        debug!(slot = slot.as_str(), index, "default checkout selection changed");
        self.writes
            .put(WriteGate::Ungated, Some(&self.user_id), &record)
            .await?;
        Ok(next)
    }

    /// Adjust the selection after the card at `index` was removed.
    pub async fn card_removed(&self, index: usize) -> Outcome<CheckoutIndices> {
        self.slot_removed(CheckoutSlot::Card, index).await
    }

    /// Adjust the selection after the address at `index` was removed.
    pub async fn address_removed(&self, index: usize) -> Outcome<CheckoutIndices> {
        self.slot_removed(CheckoutSlot::Address, index).await
    }

    /// Removing the selected entry resets the slot to the first entry.
    async fn slot_removed(&self, slot: CheckoutSlot, index: usize) -> Outcome<CheckoutIndices> {
        let current = self.current().await;
        if current.get(slot) == Some(index) {
            self.set_default(slot, 0).await
        } else {
            Ok(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockLocalStore, MockRemoteStore, RemoteStoreError};
    use crate::domain::{ErrorCode, NetworkAvailability};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn service(
        local: MockLocalStore,
        remote: MockRemoteStore,
    ) -> CheckoutDefaultsService<MockLocalStore, MockRemoteStore> {
        CheckoutDefaultsService::new(
            DualWriteCoordinator::new(
                Arc::new(local),
                Arc::new(remote),
                NetworkAvailability::online(),
            ),
            UserId::new("user-1").expect("valid user"),
        )
    }

    fn expect_puts(local: &mut MockLocalStore, remote: &mut MockRemoteStore, expected: &[Value]) {
        let mut local_seq = mockall::Sequence::new();
        let mut remote_seq = mockall::Sequence::new();
        for document in expected {
            let local_doc = document.clone();
            local
                .expect_put()
                .withf(move |path, key, stored| {
                    path.to_string() == "checkout_defaults"
                        && key.as_str() == "user-1"
                        && *stored == local_doc
                })
                .times(1)
                .in_sequence(&mut local_seq)
                .return_once(|_, _, _| Ok(()));
            let remote_doc = document.clone();
            remote
                .expect_put()
                .withf(move |_, _, stored| *stored == remote_doc)
                .times(1)
                .in_sequence(&mut remote_seq)
                .return_once(|_, _, _| Ok(()));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn second_update_keeps_the_first_field() {
        let mut local = MockLocalStore::new();
        let mut remote = MockRemoteStore::new();
        expect_puts(
            &mut local,
            &mut remote,
            &[
                json!({ "userId": "user-1", "card": 2, "address": null }),
                json!({ "userId": "user-1", "card": 2, "address": 1 }),
            ],
        );
        let service = service(local, remote);

        service
            .set_default(CheckoutSlot::Card, 2)
            .await
            .expect("card set");
        let pair = service
            .set_default(CheckoutSlot::Address, 1)
            .await
            .expect("address set");

        assert_eq!(
            pair,
            CheckoutIndices {
                card: Some(2),
                address: Some(1)
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_write_still_updates_session_selection() {
        let mut local = MockLocalStore::new();
        local.expect_put().return_once(|_, _, _| Ok(()));
        let mut remote = MockRemoteStore::new();
        remote
            .expect_put()
            .return_once(|_, _, _| Err(RemoteStoreError::unavailable("offline")));
        let service = service(local, remote);

        let err = service
            .set_default(CheckoutSlot::Card, 3)
            .await
            .expect_err("remote failed");

        assert_eq!(err.code(), ErrorCode::PartialCommit);
        assert_eq!(service.current().await.card, Some(3));
    }

    #[rstest]
    #[tokio::test]
    async fn load_surfaces_remote_errors_without_local_fallback() {
        let mut local = MockLocalStore::new();
        local.expect_get().times(0);
        let mut remote = MockRemoteStore::new();
        remote
            .expect_get()
            .return_once(|_, _| Err(RemoteStoreError::rejected(401_u16, "expired token")));

        let err = service(local, remote)
            .load_defaults()
            .await
            .expect_err("remote rejected");
        assert_eq!(err.code(), ErrorCode::RemoteFailure);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_record_means_no_selection() {
        let mut remote = MockRemoteStore::new();
        remote.expect_get().return_once(|_, _| Ok(None));

        let indices = service(MockLocalStore::new(), remote)
            .load_defaults()
            .await
            .expect("empty selection");
        assert_eq!(indices, CheckoutIndices::default());
    }

    #[rstest]
    #[case(1, Some(0))]
    #[case(2, Some(1))]
    #[tokio::test]
    async fn removing_the_default_card_resets_it_to_the_first(
        #[case] removed: usize,
        #[case] expected: Option<usize>,
    ) {
        let mut local = MockLocalStore::new();
        local.expect_put().returning(|_, _, _| Ok(()));
        let mut remote = MockRemoteStore::new();
        remote
            .expect_get()
            .return_once(|_, _| Ok(Some(json!({ "userId": "user-1", "card": 1, "address": 4 }))));
        remote.expect_put().returning(|_, _, _| Ok(()));
        let service = service(local, remote);
        service.load_defaults().await.expect("loaded");

        let pair = service.card_removed(removed).await.expect("adjusted");

        assert_eq!(pair.card, expected);
        assert_eq!(pair.address, Some(4));
    }
}
