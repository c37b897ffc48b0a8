//! Plant query, catalog view and add-plant form against the fake backend.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use greenhouse_integration_tests::{FakeBackend, sample_plant};
use greenhouse_storefront::api::PlantListParams;
use greenhouse_storefront::catalog::{CatalogFilter, CatalogPage};
use greenhouse_storefront::forms::{AddPlantForm, FormError, ValidationError};
use greenhouse_storefront::stores::LoadState;

const USER: &str = "user-catalog";

async fn backend_with_catalog() -> FakeBackend {
    let backend = FakeBackend::start().await;
    let mut snake = sample_plant("p1", "Snake Plant", 199, &["Indoor", "Air Purifying"]);
    snake.scientific_name = Some("Sansevieria trifasciata".to_string());
    backend.add_plant(snake);
    let mut aloe = sample_plant("p2", "Aloe Vera", 150, &["Succulent", "Indoor"]);
    aloe.is_available = false;
    backend.add_plant(aloe);
    backend.add_plant(sample_plant("p3", "Bougainvillea", 320, &["Outdoor", "Flowering"]));
    backend
}

fn card_ids(page: &CatalogPage) -> Vec<String> {
    match page {
        CatalogPage::Ready { cards, .. } => cards.iter().map(|c| c.plant.id.to_string()).collect(),
        other => panic!("catalog not ready: {other:?}"),
    }
}

#[tokio::test]
async fn test_catalog_filters_locally() {
    let backend = backend_with_catalog().await;
    let session = backend.session(USER);
    session.start().await;

    let mut catalog = session.catalog();
    catalog.load().await.unwrap();
    assert_eq!(card_ids(&catalog.page()), vec!["p1", "p2", "p3"]);

    catalog.filter = CatalogFilter::new().with_category("Indoor");
    assert_eq!(card_ids(&catalog.page()), vec!["p1", "p2"]);

    catalog.filter = CatalogFilter::new().with_category("");
    assert_eq!(card_ids(&catalog.page()), vec!["p1", "p2", "p3"]);

    catalog.filter = CatalogFilter::new().with_search("sansevieria");
    assert_eq!(card_ids(&catalog.page()), vec!["p1"]);

    catalog.filter = CatalogFilter::new().with_category("Indoor").in_stock_only(true);
    assert_eq!(card_ids(&catalog.page()), vec!["p1"]);

    // Filtering never goes back to the backend.
    assert_eq!(backend.request_count(&Method::GET, "/api/plants"), 1);
}

#[tokio::test]
async fn test_catalog_counters_and_flags() {
    let backend = backend_with_catalog().await;
    backend.put_in_wishlist(USER, "p3");
    backend.put_in_cart(USER, "p1", 2);
    let session = backend.session(USER);
    session.start().await;

    let catalog = session.catalog();
    catalog.load().await.unwrap();

    let CatalogPage::Ready {
        cards,
        plants_found,
        wishlist_count,
        cart_count,
    } = catalog.page()
    else {
        panic!("catalog not ready");
    };
    assert_eq!(plants_found, 3);
    assert_eq!(wishlist_count, 1);
    assert_eq!(cart_count, 2);

    let p1 = cards.iter().find(|c| c.plant.id.as_str() == "p1").unwrap();
    assert!(p1.in_cart);
    assert!(!p1.wishlisted);
    assert_eq!(p1.cart_label(), "In Cart");
    let p3 = cards.iter().find(|c| c.plant.id.as_str() == "p3").unwrap();
    assert!(p3.wishlisted);

    let outcome = catalog.toggle_wishlist(&p3.plant).await;
    assert!(outcome.success);
    assert!(!session.wishlist().is_member(&p3.plant.id));
}

#[tokio::test]
async fn test_failed_load_shows_error_and_retry_repeats_request() {
    let backend = backend_with_catalog().await;
    backend.fail(
        Method::GET,
        "/api/plants",
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("Failed to fetch plants"),
        Some(1),
    );
    let session = backend.session(USER);
    let catalog = session.catalog();

    assert!(catalog.load().await.is_err());
    assert_eq!(
        catalog.page(),
        CatalogPage::Error {
            message: "Failed to fetch plants".to_string()
        }
    );
    let failed_params = catalog.query().last_params();

    catalog.retry().await.unwrap();
    assert_eq!(catalog.query().last_params(), failed_params);
    assert_eq!(backend.request_count(&Method::GET, "/api/plants"), 2);
    assert_eq!(card_ids(&catalog.page()).len(), 3);
}

#[tokio::test]
async fn test_refetch_merges_over_initial_params() {
    let backend = backend_with_catalog().await;
    let session = backend.session(USER);
    let query = session.plants();

    query
        .refetch(&PlantListParams {
            category: Some("Outdoor".to_string()),
            ..PlantListParams::default()
        })
        .await
        .unwrap();

    let plants = query.plants();
    assert_eq!(plants.len(), 1);
    assert_eq!(plants[0].name, "Bougainvillea");
    assert_eq!(query.pagination().map(|p| p.total), Some(1));
    assert_eq!(query.status(), LoadState::Ready);
}

#[tokio::test]
async fn test_categories_are_cached() {
    let backend = backend_with_catalog().await;
    let session = backend.session(USER);

    let first = session.plants().categories().await.unwrap();
    let second = session.plants().categories().await.unwrap();
    assert_eq!(first, second);
    assert!(first.contains(&"Succulent".to_string()));
    assert_eq!(
        backend.request_count(&Method::GET, "/api/plants/categories/list"),
        1
    );
}

#[tokio::test]
async fn test_form_with_empty_name_makes_no_request() {
    let backend = backend_with_catalog().await;
    let session = backend.session(USER);

    let mut form = AddPlantForm::new();
    form.open();
    form.price = "199".to_string();
    form.add_category("Indoor");

    let err = form.submit(session.client(), session.plants()).await.unwrap_err();
    assert!(matches!(
        err,
        FormError::Validation(ValidationError::MissingName)
    ));
    assert!(form.is_open());
    assert_eq!(form.error.as_deref(), Some("Please fill in all required fields"));
    assert_eq!(backend.total_requests(), 0);
}

#[tokio::test]
async fn test_form_submit_creates_plant_reloads_and_resets() {
    let backend = backend_with_catalog().await;
    let session = backend.session(USER);
    let catalog = session.catalog();
    catalog.load().await.unwrap();
    let before = session.plants().categories().await.unwrap();
    assert!(!before.contains(&"Medicinal".to_string()));

    let mut form = AddPlantForm::new();
    form.open();
    form.name = "Tulsi".to_string();
    form.price = "49.50".to_string();
    form.add_category("Medicinal");

    let plant = form.submit(session.client(), session.plants()).await.unwrap();
    assert_eq!(plant.name, "Tulsi");
    assert!(!form.is_open());
    assert!(form.name.is_empty());
    assert!(form.error.is_none());

    assert_eq!(backend.plant_count(), 4);
    assert_eq!(card_ids(&catalog.page()).len(), 4);
    assert_eq!(backend.request_count(&Method::GET, "/api/plants"), 2);

    // Creating a plant invalidates the cached category list.
    let after = session.plants().categories().await.unwrap();
    assert!(after.contains(&"Medicinal".to_string()));
}

#[tokio::test]
async fn test_form_submit_failure_stays_open_with_message() {
    let backend = backend_with_catalog().await;
    backend.fail(
        Method::POST,
        "/api/plants",
        StatusCode::BAD_REQUEST,
        Some("Plant with this name already exists"),
        None,
    );
    let session = backend.session(USER);

    let mut form = AddPlantForm::new();
    form.open();
    form.name = "Snake Plant".to_string();
    form.price = "199".to_string();
    form.add_category("Indoor");

    let err = form.submit(session.client(), session.plants()).await.unwrap_err();
    assert!(matches!(err, FormError::Submit(_)));
    assert!(form.is_open());
    assert_eq!(form.name, "Snake Plant");
    assert_eq!(
        form.error.as_deref(),
        Some("Plant with this name already exists")
    );
}
