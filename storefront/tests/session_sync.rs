//! End-to-end behaviour of session bootstrap and catalog routing.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;
use storefront::domain::ports::{FixtureNetworkProbe, LocalStore, RemoteStore};
use storefront::domain::{Collection, ErrorCode, NetworkAvailability, UserId};
use storefront::outbound::{FileLocalStore, InMemoryDocumentStore};
use storefront::StorefrontSession;

mod support;

use support::{MemorySession, ports, product_document, remote_catalog, shared};

#[rstest]
#[tokio::test]
async fn online_sync_returns_remote_catalog_and_fills_the_cache() {
    let local = Arc::new(InMemoryDocumentStore::new());
    let remote = Arc::new(remote_catalog(&[
        ("p-1", "Shoes"),
        ("p-2", "Dresses"),
        ("p-3", "Shoes"),
    ]));
    let session: MemorySession<_, _> = StorefrontSession::start(
        ports(Arc::clone(&local), Arc::clone(&remote)),
        &FixtureNetworkProbe(true),
        None,
        false,
    )
    .await;

    let snapshot = session.initial_sync().await.expect("initial sync");

    assert_eq!(session.network(), NetworkAvailability::online());
    assert_eq!(snapshot.products.len(), 3);
    assert_eq!(snapshot.categories, ["Dresses", "Shoes"]);
    assert_eq!(local.len(&shared(Collection::Products)).await, 3);
    assert!(snapshot.promos.expect("promos listed").is_empty());
    assert!(snapshot.cards.is_none());
    assert!(snapshot.checkout.is_none());
    assert!(snapshot.my_reviews.is_none());
}

#[rstest]
#[tokio::test]
async fn offline_sync_with_empty_cache_is_empty_not_an_error() {
    let remote = Arc::new(remote_catalog(&[("p-1", "Shoes")]));
    let session: MemorySession<_, _> = StorefrontSession::start(
        ports(Arc::new(InMemoryDocumentStore::new()), remote),
        &FixtureNetworkProbe(false),
        Some(UserId::new("user-1").expect("valid user")),
        false,
    )
    .await;

    let snapshot = session.initial_sync().await.expect("offline sync");

    assert!(snapshot.products.is_empty());
    let promos = snapshot.promos.expect_err("remote skipped offline");
    assert_eq!(promos.code(), ErrorCode::NetworkUnavailable);
    let cards = snapshot.cards.expect("user signed in").expect_err("offline");
    assert_eq!(cards.code(), ErrorCode::NetworkUnavailable);
    let my_reviews = snapshot
        .my_reviews
        .expect("user signed in")
        .expect_err("offline");
    assert_eq!(my_reviews.code(), ErrorCode::NetworkUnavailable);
}

#[rstest]
#[tokio::test]
async fn forced_offline_ignores_a_reachable_backend() {
    let local = Arc::new(InMemoryDocumentStore::new());
    LocalStore::put(
        local.as_ref(),
        &shared(Collection::Products),
        &support::key("cached"),
        &product_document("cached", "Hats"),
    )
    .await
    .expect("seed cache");
    let remote = Arc::new(remote_catalog(&[("fresh", "Shoes")]));
    let session: MemorySession<_, _> =
        StorefrontSession::start(ports(local, remote), &FixtureNetworkProbe(true), None, true)
            .await;

    let products = session.catalog().products().await.expect("cached catalog");

    let ids: Vec<_> = products.iter().map(|product| product.id.as_str()).collect();
    assert_eq!(ids, ["cached"]);
}

#[rstest]
#[tokio::test]
async fn file_cache_serves_the_next_offline_session() {
    let cache_dir = tempfile::tempdir().expect("temp dir");
    let remote = Arc::new(remote_catalog(&[("p-1", "Shoes"), ("p-2", "Bags")]));

    let online: MemorySession<_, _> = StorefrontSession::with_network(
        ports(
            Arc::new(FileLocalStore::open(cache_dir.path()).expect("open cache")),
            Arc::clone(&remote),
        ),
        None,
        NetworkAvailability::online(),
    );
    let fetched = online.catalog().products().await.expect("online read");
    drop(online);

    RemoteStore::clear(remote.as_ref(), &shared(Collection::Products))
        .await
        .expect("backend emptied");
    let offline: MemorySession<_, _> = StorefrontSession::with_network(
        ports(
            Arc::new(FileLocalStore::open(cache_dir.path()).expect("reopen cache")),
            remote,
        ),
        None,
        NetworkAvailability::offline(),
    );
    let cached = offline.catalog().products().await.expect("offline read");

    assert_eq!(cached, fetched);
}

#[rstest]
#[tokio::test]
async fn online_sync_lists_the_signed_in_users_reviews() {
    let remote = Arc::new(remote_catalog(&[("p-1", "Shoes")]));
    for (id, author, product) in [
        ("6f0c5a5e-0000-4000-8000-000000000001", "user-1", "p-1"),
        ("6f0c5a5e-0000-4000-8000-000000000002", "user-2", "p-1"),
    ] {
        RemoteStore::put(
            remote.as_ref(),
            &shared(Collection::Reviews),
            &support::key(id),
            &json!({
                "id": id,
                "userId": author,
                "productId": product,
                "rating": 4,
                "text": "fits well",
                "imageUrls": [],
                "createdAt": "2026-03-01T10:00:00Z",
            }),
        )
        .await
        .expect("seed review");
    }
    let session: MemorySession<_, _> = StorefrontSession::start(
        ports(Arc::new(InMemoryDocumentStore::new()), remote),
        &FixtureNetworkProbe(true),
        Some(UserId::new("user-1").expect("valid user")),
        false,
    )
    .await;

    let snapshot = session.initial_sync().await.expect("initial sync");

    let mine = snapshot
        .my_reviews
        .expect("user signed in")
        .expect("reviews listed");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_id.as_str(), "user-1");
}
