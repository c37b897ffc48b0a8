//! Wishlist store against the fake backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use greenhouse_core::PlantId;
use greenhouse_integration_tests::{FakeBackend, sample_plant};
use greenhouse_storefront::notifications::NoticeLevel;
use greenhouse_storefront::stores::LoadState;

const USER: &str = "user-wishlist";

fn wishlist_path() -> String {
    format!("/api/wishlist/{USER}")
}

#[tokio::test]
async fn test_add_is_visible_immediately_and_confirmed_by_refetch() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());

    let session = backend.session(USER);
    session.start().await;
    assert_eq!(session.wishlist().count(), 0);

    let outcome = session.wishlist().add(&p1).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Added to wishlist!");
    assert!(session.wishlist().is_member(&p1.id));
    assert!(session.wishlist().is_pending(&p1.id));

    session.wishlist().flush_pending().await;

    assert!(session.wishlist().is_member(&p1.id));
    assert!(!session.wishlist().is_pending(&p1.id));
    assert_eq!(backend.wishlist_of(USER), vec!["p1"]);
    // initial fetch + confirmatory refetch
    assert_eq!(backend.request_count(&Method::GET, &wishlist_path()), 2);
}

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    let session = backend.session(USER);
    session.start().await;

    assert!(session.wishlist().toggle(&p1).await.success);
    assert!(session.wishlist().is_member(&p1.id));

    let outcome = session.wishlist().toggle(&p1).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Removed from wishlist!");
    assert!(!session.wishlist().is_member(&p1.id));

    session.wishlist().flush_pending().await;
    assert!(!session.wishlist().is_member(&p1.id));
    assert!(backend.wishlist_of(USER).is_empty());
}

#[tokio::test]
async fn test_add_of_member_is_a_noop() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    backend.put_in_wishlist(USER, "p1");
    let session = backend.session(USER);
    session.start().await;

    let outcome = session.wishlist().add(&p1).await;
    assert!(outcome.success);
    assert_eq!(backend.request_count(&Method::POST, &wishlist_path()), 0);
}

#[tokio::test]
async fn test_failed_add_leaves_state_and_notifies() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    backend.fail(
        Method::POST,
        &wishlist_path(),
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("Database unavailable"),
        None,
    );

    let session = backend.session(USER);
    let mut notices = session.notifications().subscribe();
    session.start().await;

    let outcome = session.wishlist().add(&p1).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Database unavailable");
    assert!(!session.wishlist().is_member(&p1.id));

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Failed to add to wishlist: Database unavailable");
}

#[tokio::test]
async fn test_success_false_envelope_is_a_failure() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    backend.fail(
        Method::DELETE,
        &format!("/api/wishlist/{USER}/p1"),
        StatusCode::OK,
        Some("Wishlist is locked"),
        Some(1),
    );
    backend.put_in_wishlist(USER, "p1");

    let session = backend.session(USER);
    session.start().await;

    let outcome = session.wishlist().remove(&p1.id).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Wishlist is locked");
    assert!(session.wishlist().is_member(&p1.id));
}

#[tokio::test]
async fn test_fetch_failure_empties_set_and_records_error() {
    let backend = FakeBackend::start().await;
    backend.add_plant(sample_plant("p1", "Snake Plant", 199, &["Indoor"]));
    backend.put_in_wishlist(USER, "p1");

    let session = backend.session(USER);
    session.start().await;
    assert_eq!(session.wishlist().count(), 1);

    backend.fail(Method::GET, &wishlist_path(), StatusCode::BAD_GATEWAY, None, None);
    let err = session.wishlist().fetch().await.unwrap_err();

    assert_eq!(err.message(), "Something went wrong");
    assert_eq!(session.wishlist().count(), 0);
    assert_eq!(
        session.wishlist().status(),
        LoadState::Failed("Something went wrong".to_string())
    );
    assert_eq!(session.wishlist().error().as_deref(), Some("Something went wrong"));
}

#[tokio::test]
async fn test_refetch_reconciles_with_backend() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    backend.add_plant(sample_plant("p2", "Fern", 80, &["Foliage"]));

    let session = backend.session(USER);
    session.start().await;

    // Another device adds p2 while this one adds p1.
    backend.put_in_wishlist(USER, "p2");
    session.wishlist().add(&p1).await;
    assert!(!session.wishlist().is_member(&PlantId::new("p2")));

    session.wishlist().flush_pending().await;
    let mut ids: Vec<String> = session.wishlist().ids().iter().map(ToString::to_string).collect();
    ids.sort();
    assert_eq!(ids, vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_stale_fetch_does_not_undo_optimistic_add() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    let session = backend.session(USER);

    // The first wishlist GET answers with the empty list, but late.
    backend.delay(Method::GET, &wishlist_path(), Duration::from_millis(300), 1);
    let slow_fetch = {
        let store = session.wishlist().clone();
        tokio::spawn(async move { store.fetch().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(session.wishlist().add(&p1).await.success);
    slow_fetch.await.unwrap().unwrap();

    assert!(session.wishlist().is_member(&p1.id));
    assert_ne!(session.wishlist().status(), LoadState::Loading);

    session.wishlist().flush_pending().await;
    assert!(session.wishlist().is_member(&p1.id));
}

#[tokio::test]
async fn test_shutdown_cancels_pending_refetch() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    let session = backend.session(USER);

    session.wishlist().add(&p1).await;
    session.abort();
    session.wishlist().flush_pending().await;

    assert_eq!(backend.request_count(&Method::GET, &wishlist_path()), 0);
    assert!(session.wishlist().is_pending(&p1.id));
}

#[tokio::test]
async fn test_shutdown_during_flush_cancels_refetch() {
    let backend = FakeBackend::start().await;
    let p1 = sample_plant("p1", "Snake Plant", 199, &["Indoor"]);
    backend.add_plant(p1.clone());
    let session = backend.session(USER);

    session.wishlist().add(&p1).await;
    let wishlist = session.wishlist().clone();
    let flush = tokio::spawn(async move { wishlist.flush_pending().await });
    tokio::time::sleep(Duration::from_millis(2)).await;
    session.wishlist().shutdown();

    tokio::time::timeout(Duration::from_millis(500), flush)
        .await
        .unwrap()
        .unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(backend.request_count(&Method::GET, &wishlist_path()), 0);
    assert!(session.wishlist().is_pending(&p1.id));
}

#[tokio::test]
async fn test_wishlist_page_lists_and_removes_plants() {
    let backend = FakeBackend::start().await;
    backend.add_plant(sample_plant("p1", "Snake Plant", 199, &["Indoor"]));
    let mut unavailable = sample_plant("p2", "Blue Orchid", 950, &["Flowering"]);
    unavailable.is_available = false;
    backend.add_plant(unavailable);
    backend.put_in_wishlist(USER, "p1");
    backend.put_in_wishlist(USER, "p2");

    let session = backend.session(USER);
    session.start().await;
    let page = session.wishlist_page();
    page.load().await.unwrap();

    let plants = page.plants();
    assert_eq!(plants.len(), 2);
    assert!(page.can_add_to_cart(&plants[0]));
    assert!(!page.can_add_to_cart(&plants[1]));

    // Unavailable plants never reach the backend.
    assert!(!page.add_to_cart(&plants[1]).await.success);
    assert!(page.add_to_cart(&plants[0]).await.success);
    assert!(!page.can_add_to_cart(&plants[0]));
    assert_eq!(backend.cart_of(USER), vec![("p1".to_string(), 1)]);

    assert!(page.remove(&PlantId::new("p2")).await.success);
    assert_eq!(page.plants().len(), 1);

    page.refresh().await.unwrap();
    assert_eq!(session.wishlist().ids(), vec![PlantId::new("p1")]);
}
