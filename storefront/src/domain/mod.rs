//! Domain primitives, ports and services of the synchronisation core.
//!
//! Purpose: keep the rules that decide where a read comes from and how a
//! write reaches both stores independent of any concrete storage. Adapters
//! live in [`crate::outbound`] and plug in through [`ports`].
//!
//! Public surface:
//! - [`Outcome`] / [`Error`] / [`ErrorCode`]: the result algebra.
//! - [`NetworkAvailability`]: per-session connectivity value.
//! - [`DualWriteCoordinator`]: concurrent writes to both stores.
//! - [`CatalogSyncRouter`]: network-aware reads with cache write-through.
//! - [`ReviewService`] and [`CheckoutDefaultsService`]: derived state.
//! - [`StorefrontSyncService`]: user-facing write paths.

pub mod card;
pub mod catalog_router;
pub mod checkout;
pub mod checkout_defaults_service;
pub mod commerce;
pub mod dual_write;
pub mod entity;
pub mod error;
pub mod keys;
pub mod network;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod storefront_service;

pub use self::card::{CipherText, PaymentCard, StoredCard};
pub use self::catalog_router::{CatalogSyncRouter, ProductListing, categories, product_listings};
pub use self::checkout::{CheckoutIndices, CheckoutSlot, DefaultCheckoutIndex};
pub use self::checkout_defaults_service::CheckoutDefaultsService;
pub use self::commerce::{
    Address, CartItem, Favorite, Order, OrderStatus, Product, Promo, bag_total_cents,
};
pub use self::dual_write::{DualWriteCoordinator, WriteGate};
pub use self::entity::{
    Collection, CollectionPath, SyncableEntity, USERS_SEGMENT, decode, decode_all, encode,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, Outcome, combine_all, first_failure};
pub use self::keys::{EntityKey, KeyValidationError, ProductId, PromoCode, UserId};
pub use self::network::NetworkAvailability;
pub use self::review::{
    HelpfulMark, LocalImageRef, Rating, RatingOutOfRange, Review, ReviewAggregate, ReviewDraft,
};
pub use self::review_service::{ReviewService, SubmittedReview};
pub use self::storefront_service::StorefrontSyncService;
