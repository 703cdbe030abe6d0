//! Session bootstrap: probe connectivity once and wire the services.
//!
//! A session freezes its [`NetworkAvailability`] before any read or write is
//! issued and hands the same value to every component. Starting a new session
//! is the only way to observe a change in connectivity.

use std::future::Future;
use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{CardCipher, ImageUploader, LocalStore, NetworkProbe, RemoteStore};
use crate::domain::{
    Address, CatalogSyncRouter, CheckoutDefaultsService, CheckoutIndices, DualWriteCoordinator,
    Error, NetworkAvailability, Outcome, PaymentCard, Product, Promo, Review, ReviewService,
    StorefrontSyncService, UserId, categories,
};

/// Adapters a session is built from.
pub struct SessionPorts<L, R, C, U> {
    /// On-device cache.
    pub local: Arc<L>,
    /// Authoritative backend.
    pub remote: Arc<R>,
    /// Card encryption used around every card write and read.
    pub cipher: Arc<C>,
    /// Review image uploader.
    pub uploader: Arc<U>,
    /// Source of review timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Services bound to one user and one connectivity snapshot.
pub struct StorefrontSession<L, R, C, U> {
    network: NetworkAvailability,
    user_id: Option<UserId>,
    catalog: CatalogSyncRouter<L, R>,
    storefront: StorefrontSyncService<L, R, C>,
    reviews: Option<ReviewService<R, U>>,
    checkout: Option<CheckoutDefaultsService<L, R>>,
}

/// Data loaded by [`StorefrontSession::initial_sync`].
///
/// The catalog is mandatory; every other read keeps its own outcome so one
/// failing collection does not hide the others. User-scoped reads are `None`
/// when nobody is signed in.
#[derive(Debug)]
pub struct SessionSnapshot {
    /// Catalog as served by the router.
    pub products: Vec<Product>,
    /// Sorted category names of [`Self::products`].
    pub categories: Vec<String>,
    /// Current promotions.
    pub promos: Outcome<Vec<Promo>>,
    /// The user's decrypted cards.
    pub cards: Option<Outcome<Vec<PaymentCard>>>,
    /// The user's shipping addresses.
    pub addresses: Option<Outcome<Vec<Address>>>,
    /// The user's default checkout selection.
    pub checkout: Option<Outcome<CheckoutIndices>>,
    /// Reviews the user has written, newest first.
    pub my_reviews: Option<Outcome<Vec<Review>>>,
}

impl<L, R, C, U> StorefrontSession<L, R, C, U>
where
    L: LocalStore,
    R: RemoteStore,
    C: CardCipher,
    U: ImageUploader,
{
    /// Probe connectivity, unless `force_offline`, and build the session.
    pub async fn start(
        ports: SessionPorts<L, R, C, U>,
        probe: &dyn NetworkProbe,
        user_id: Option<UserId>,
        force_offline: bool,
    ) -> Self {
        let network = NetworkAvailability::probe(probe, force_offline).await;
        Self::with_network(ports, user_id, network)
    }

    /// Build a session for an already known availability.
    pub fn with_network(
        ports: SessionPorts<L, R, C, U>,
        user_id: Option<UserId>,
        network: NetworkAvailability,
    ) -> Self {
        let SessionPorts {
            local,
            remote,
            cipher,
            uploader,
            clock,
        } = ports;
        let writes = DualWriteCoordinator::new(Arc::clone(&local), Arc::clone(&remote), network);
        let reviews = user_id.clone().map(|user| {
            ReviewService::new(Arc::clone(&remote), Arc::clone(&uploader), clock, user)
        });
        let checkout = user_id
            .clone()
            .map(|user| CheckoutDefaultsService::new(writes.clone(), user));
        Self {
            network,
            catalog: CatalogSyncRouter::new(local, remote, network),
            storefront: StorefrontSyncService::new(writes, cipher, user_id.clone()),
            reviews,
            checkout,
            user_id,
        }
    }

    /// Availability frozen at session start.
    pub fn network(&self) -> NetworkAvailability {
        self.network
    }

    /// Signed-in user, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Catalog read router.
    pub fn catalog(&self) -> &CatalogSyncRouter<L, R> {
        &self.catalog
    }

    /// Favourites, bag, orders, addresses, cards and promotions.
    pub fn storefront(&self) -> &StorefrontSyncService<L, R, C> {
        &self.storefront
    }

    /// Review service, available once a user is signed in.
    pub fn reviews(&self) -> Option<&ReviewService<R, U>> {
        self.reviews.as_ref()
    }

    /// Default checkout service, available once a user is signed in.
    pub fn checkout(&self) -> Option<&CheckoutDefaultsService<L, R>> {
        self.checkout.as_ref()
    }

    /// Load what the storefront needs on launch.
    ///
    /// The catalog goes through the router and its failure aborts the sync.
    /// Promotions and, for a signed-in user, cards, addresses, default
    /// checkout and the user's own reviews are read from the backend
    /// concurrently; offline sessions skip them with `NetworkUnavailable`.
    pub async fn initial_sync(&self) -> Outcome<SessionSnapshot> {
        let products = self.catalog.products().await?;
        let categories = categories(&products);
        info!(
            network = %self.network,
            products = products.len(),
            categories = categories.len(),
            "catalog synchronised"
        );

        let signed_in = self.user_id.is_some();
        let (promos, cards, addresses, checkout, my_reviews) = tokio::join!(
            self.remote_read(self.storefront.list_promos()),
            self.signed_in_read(signed_in, self.storefront.list_cards()),
            self.signed_in_read(signed_in, self.storefront.list_addresses()),
            async {
                match &self.checkout {
                    Some(checkout) => Some(self.remote_read(checkout.load_defaults()).await),
                    None => None,
                }
            },
            async {
                match &self.reviews {
                    Some(reviews) => Some(self.remote_read(reviews.my_reviews()).await),
                    None => None,
                }
            },
        );

        for (collection, failure) in [
            ("promos", promos.as_ref().err()),
            ("cards", cards.as_ref().and_then(|outcome| outcome.as_ref().err())),
            (
                "addresses",
                addresses.as_ref().and_then(|outcome| outcome.as_ref().err()),
            ),
            (
                "checkout_defaults",
                checkout.as_ref().and_then(|outcome| outcome.as_ref().err()),
            ),
            (
                "reviews",
                my_reviews.as_ref().and_then(|outcome| outcome.as_ref().err()),
            ),
        ] {
            if let Some(err) = failure {
                warn!(collection, error = %err, "initial read failed");
            }
        }

        Ok(SessionSnapshot {
            products,
            categories,
            promos,
            cards,
            addresses,
            checkout,
            my_reviews,
        })
    }

    async fn remote_read<T>(&self, read: impl Future<Output = Outcome<T>>) -> Outcome<T> {
        if self.network.is_available() {
            read.await
        } else {
            Err(Error::network_unavailable())
        }
    }

    async fn signed_in_read<T>(
        &self,
        signed_in: bool,
        read: impl Future<Output = Outcome<T>>,
    ) -> Option<Outcome<T>> {
        if signed_in {
            Some(self.remote_read(read).await)
        } else {
            None
        }
    }
}
