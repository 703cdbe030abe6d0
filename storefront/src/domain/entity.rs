//! Collections and the typed view over store documents.
//!
//! Both stores are document-oriented: they hold `serde_json::Value` documents
//! keyed by `(CollectionPath, EntityKey)`. A path names the collection and,
//! for records belonging to one user, that user. [`SyncableEntity`] ties a
//! domain type to its collection and key so services can encode and decode
//! documents.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{EntityKey, Error, Outcome, UserId};

/// Every collection mirrored between the local cache and the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Catalog products.
    Products,
    /// Products the user marked as favourite.
    Favorites,
    /// Lines currently in the shopping bag.
    Cart,
    /// Placed orders.
    Orders,
    /// Shipping addresses.
    Addresses,
    /// Encrypted payment cards.
    Cards,
    /// Promotion codes.
    Promos,
    /// Product reviews.
    Reviews,
    /// Reviews the user marked as helpful.
    HelpfulReviews,
    /// Default card and address selection.
    CheckoutDefaults,
}

impl Collection {
    /// All collections, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Products,
        Self::Favorites,
        Self::Cart,
        Self::Orders,
        Self::Addresses,
        Self::Cards,
        Self::Promos,
        Self::Reviews,
        Self::HelpfulReviews,
        Self::CheckoutDefaults,
    ];

    /// Stable storage name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Favorites => "favorites",
            Self::Cart => "cart",
            Self::Orders => "orders",
            Self::Addresses => "addresses",
            Self::Cards => "cards",
            Self::Promos => "promos",
            Self::Reviews => "reviews",
            Self::HelpfulReviews => "helpful_reviews",
            Self::CheckoutDefaults => "checkout_defaults",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Collection {
    /// Whether documents of this collection belong to a single user.
    ///
    /// Catalog data, promotions, reviews and checkout defaults (keyed by the
    /// user id itself) are shared; everything a shopper owns is not.
    pub fn is_user_scoped(&self) -> bool {
        matches!(
            self,
            Self::Favorites
                | Self::Cart
                | Self::Orders
                | Self::Addresses
                | Self::Cards
                | Self::HelpfulReviews
        )
    }
}

/// Segment that precedes the owner in user-scoped paths.
pub const USERS_SEGMENT: &str = "users";

/// A collection as addressed inside a store.
///
/// User-scoped collections always carry their owner, so two users never read
/// or clear each other's records. Shared collections never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    collection: Collection,
    owner: Option<UserId>,
}

impl CollectionPath {
    /// Address `collection`, owned by `owner` when it is user-scoped.
    ///
    /// The owner is ignored for shared collections.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when a user-scoped collection is addressed
    /// without a signed-in user.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{Collection, CollectionPath, UserId};
    ///
    /// let user = UserId::new("u-1").expect("valid user");
    /// let cart = CollectionPath::new(Collection::Cart, Some(&user)).expect("owned");
    /// assert_eq!(cart.to_string(), "users/u-1/cart");
    /// assert!(CollectionPath::new(Collection::Cart, None).is_err());
    /// ```
    pub fn new(collection: Collection, owner: Option<&UserId>) -> Outcome<Self> {
        if !collection.is_user_scoped() {
            return Ok(Self {
                collection,
                owner: None,
            });
        }
        let owner = owner.ok_or_else(|| {
            Error::invalid_request(format!("{collection} requires a signed-in user"))
        })?;
        Ok(Self {
            collection,
            owner: Some(owner.clone()),
        })
    }

    /// Address `collection` on behalf of `owner`.
    pub fn of_user(collection: Collection, owner: &UserId) -> Self {
        Self {
            collection,
            owner: collection.is_user_scoped().then(|| owner.clone()),
        }
    }

    /// Address a shared collection.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for user-scoped collections.
    pub fn shared(collection: Collection) -> Outcome<Self> {
        Self::new(collection, None)
    }

    /// Collection being addressed.
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Owner of a user-scoped collection.
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{USERS_SEGMENT}/{owner}/{}", self.collection),
            None => f.write_str(self.collection.as_str()),
        }
    }
}

/// A record owned jointly by the local cache and the backend.
///
/// Implementors are identified by a stable key; both stores must converge to
/// the same document per key after a successful dual-write.
pub trait SyncableEntity: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the entity lives in.
    const COLLECTION: Collection;

    /// Stable key of this entity inside [`Self::COLLECTION`].
    fn key(&self) -> EntityKey;
}

/// Serialise an entity into a store document.
pub fn encode<T: SyncableEntity>(entity: &T) -> Result<Value, Error> {
    serde_json::to_value(entity).map_err(|err| {
        Error::internal(format!(
            "failed to encode {} document: {err}",
            T::COLLECTION
        ))
    })
}

/// Deserialise a store document into an entity.
pub fn decode<T: SyncableEntity>(document: Value) -> Result<T, Error> {
    serde_json::from_value(document).map_err(|err| {
        Error::internal(format!(
            "failed to decode {} document: {err}",
            T::COLLECTION
        ))
    })
}

/// Deserialise a batch of documents, failing on the first malformed one.
pub fn decode_all<T: SyncableEntity>(documents: Vec<Value>) -> Result<Vec<T>, Error> {
    documents.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Promo};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn collection_names_are_unique() {
        let mut names: Vec<_> = Collection::ALL.iter().map(Collection::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Collection::ALL.len());
    }

    #[rstest]
    fn owned_paths_of_different_users_differ() {
        let alice = UserId::new("alice").expect("valid user");
        let bob = UserId::new("bob").expect("valid user");
        assert_ne!(
            CollectionPath::of_user(Collection::Cards, &alice),
            CollectionPath::of_user(Collection::Cards, &bob)
        );
    }

    #[rstest]
    fn shared_paths_drop_the_owner() {
        let alice = UserId::new("alice").expect("valid user");
        let path = CollectionPath::of_user(Collection::Products, &alice);
        assert_eq!(path.owner(), None);
        assert_eq!(path, CollectionPath::shared(Collection::Products).expect("shared"));
        assert_eq!(path.to_string(), "products");
    }

    #[rstest]
    #[case(Collection::Favorites)]
    #[case(Collection::Cart)]
    #[case(Collection::Cards)]
    #[case(Collection::HelpfulReviews)]
    fn user_scoped_collections_need_an_owner(#[case] collection: Collection) {
        let err = CollectionPath::shared(collection).expect_err("owner required");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn decode_reports_collection_on_malformed_document() {
        let err = decode::<Promo>(json!({ "code": 42 })).expect_err("malformed promo");
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(err.message().contains("promos"));
    }

    #[rstest]
    fn decode_all_preserves_order() {
        let documents = vec![
            json!({ "code": "SPRING10", "salePercent": 10 }),
            json!({ "code": "VIP25", "salePercent": 25 }),
        ];
        let promos: Vec<Promo> = decode_all(documents).expect("valid promos");
        let codes: Vec<_> = promos.iter().map(|promo| promo.code.as_str()).collect();
        assert_eq!(codes, ["SPRING10", "VIP25"]);
    }
}
