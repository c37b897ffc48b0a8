//! Integration test harness for the Greenhouse storefront client.
//!
//! [`FakeBackend`] serves the plant backend's REST contract from memory on
//! an ephemeral port, so tests drive the real `reqwest` client end to end.
//! It records every request and can inject failures and delays per route.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! backend.add_plant(sample_plant("p1", "Snake Plant", 199, &["Indoor"]));
//!
//! let session = backend.session("user-1");
//! session.start().await;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use greenhouse_core::{
    CareLevel, CartLineItem, LightRequirement, NewPlant, Pagination, Plant, PlantId, Price,
};
use greenhouse_storefront::identity::StaticIdentity;
use greenhouse_storefront::{Session, StorefrontConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Delay used for confirmatory wishlist refetches in tests.
pub const TEST_REFETCH_DELAY: Duration = Duration::from_millis(20);

// =============================================================================
// Backend state
// =============================================================================

/// A canned failure for one route.
#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    path: String,
    status: StatusCode,
    body: Value,
    /// Remaining responses to fail; `None` fails forever.
    remaining: Option<usize>,
}

#[derive(Debug, Clone)]
struct Delay {
    method: Method,
    path: String,
    duration: Duration,
    remaining: usize,
}

#[derive(Debug, Default)]
struct BackendState {
    plants: Vec<Plant>,
    next_plant: u32,
    carts: HashMap<String, Vec<(PlantId, u32)>>,
    wishlists: HashMap<String, Vec<PlantId>>,
    requests: Vec<(Method, String)>,
    failures: Vec<Failure>,
    delays: Vec<Delay>,
}

impl BackendState {
    fn plant(&self, id: &PlantId) -> Option<&Plant> {
        self.plants.iter().find(|p| &p.id == id)
    }

    fn cart_items(&self, user: &str) -> Vec<CartLineItem> {
        self.carts
            .get(user)
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(|(id, quantity)| {
                        self.plant(id).map(|plant| CartLineItem {
                            plant_id: plant.id.clone(),
                            name: plant.name.clone(),
                            scientific_name: plant.scientific_name.clone(),
                            price: plant.price,
                            quantity: *quantity,
                            categories: plant.categories.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// FakeBackend
// =============================================================================

/// In-memory plant backend listening on `127.0.0.1:<ephemeral>`.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl FakeBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// `http://127.0.0.1:<port>/api`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration does not parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> StorefrontConfig {
        let base_url = self.base_url();
        let identity_file = std::env::temp_dir()
            .join(format!("greenhouse-it-{}", uuid::Uuid::new_v4().simple()))
            .join("identity");
        let identity_file = identity_file.to_string_lossy().into_owned();
        let delay = TEST_REFETCH_DELAY.as_millis().to_string();

        StorefrontConfig::from_lookup(|key| match key {
            "GREENHOUSE_API_URL" => Some(base_url.clone()),
            "GREENHOUSE_API_TIMEOUT_SECS" => Some("2".to_string()),
            "GREENHOUSE_REFETCH_DELAY_MS" => Some(delay.clone()),
            "GREENHOUSE_IDENTITY_FILE" => Some(identity_file.clone()),
            _ => None,
        })
        .expect("Fake backend config is valid")
    }

    /// A session for `user` against this backend.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn session(&self, user: &str) -> Session {
        Session::with_identity(self.config(), Arc::new(StaticIdentity::new(user)))
            .expect("Session builds")
    }

    // =========================================================================
    // Seeding and inspection
    // =========================================================================

    pub fn add_plant(&self, plant: Plant) {
        lock(&self.state).plants.push(plant);
    }

    /// Put a line in `user`'s cart directly, bypassing the API.
    pub fn put_in_cart(&self, user: &str, plant_id: &str, quantity: u32) {
        lock(&self.state)
            .carts
            .entry(user.to_string())
            .or_default()
            .push((PlantId::new(plant_id), quantity));
    }

    /// Wishlist `plant_id` for `user` directly, bypassing the API.
    pub fn put_in_wishlist(&self, user: &str, plant_id: &str) {
        lock(&self.state)
            .wishlists
            .entry(user.to_string())
            .or_default()
            .push(PlantId::new(plant_id));
    }

    /// Server-side wishlist for `user`.
    #[must_use]
    pub fn wishlist_of(&self, user: &str) -> Vec<String> {
        lock(&self.state)
            .wishlists
            .get(user)
            .map(|ids| ids.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Server-side cart for `user` as `(plant id, quantity)`.
    #[must_use]
    pub fn cart_of(&self, user: &str) -> Vec<(String, u32)> {
        lock(&self.state)
            .carts
            .get(user)
            .map(|lines| lines.iter().map(|(id, q)| (id.to_string(), *q)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn plant_count(&self) -> usize {
        lock(&self.state).plants.len()
    }

    /// Number of requests received for `method path` (path without query).
    #[must_use]
    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    #[must_use]
    pub fn total_requests(&self) -> usize {
        lock(&self.state).requests.len()
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    /// Answer `method path` with `status` and `{"success": false, "message"}`
    /// for the next `times` requests (`None` for every request).
    pub fn fail(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        message: Option<&str>,
        times: Option<usize>,
    ) {
        let body = message.map_or_else(
            || json!({ "success": false }),
            |m| json!({ "success": false, "message": m }),
        );
        lock(&self.state).failures.push(Failure {
            method,
            path: path.to_string(),
            status,
            body,
            remaining: times,
        });
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        lock(&self.state).failures.clear();
    }

    /// Hold the next `times` responses for `method path` back by `duration`.
    pub fn delay(&self, method: Method, path: &str, duration: Duration, times: usize) {
        lock(&self.state).delays.push(Delay {
            method,
            path: path.to_string(),
            duration,
            remaining: times,
        });
    }
}

/// A plant with sensible defaults for the fields tests rarely care about.
#[must_use]
pub fn sample_plant(id: &str, name: &str, price: u32, categories: &[&str]) -> Plant {
    Plant {
        id: PlantId::new(id),
        name: name.to_string(),
        scientific_name: None,
        price: Price::from(price),
        categories: categories.iter().map(|c| (*c).to_string()).collect(),
        is_available: true,
        care_level: CareLevel::Medium,
        light_requirement: LightRequirement::Medium,
        description: None,
        image: None,
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/plants", get(list_plants).post(create_plant))
        .route("/plants/categories/list", get(list_categories))
        .route(
            "/plants/{id}",
            get(get_plant).put(update_plant).delete(delete_plant),
        )
        .route("/cart/{user}", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/cart/{user}/{plant}", put(update_cart_item).delete(remove_from_cart))
        .route("/wishlist/{user}", get(get_wishlist).post(add_to_wishlist))
        .route(
            "/wishlist/{user}/{plant}",
            axum::routing::delete(remove_from_wishlist),
        );

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            record_and_inject,
        ))
        .with_state(state)
}

/// Log the request, then apply any matching delay and failure.
async fn record_and_inject(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (delay, failure) = {
        let mut s = lock(&state);
        s.requests.push((method.clone(), path.clone()));

        let delay = s
            .delays
            .iter_mut()
            .find(|d| d.method == method && d.path == path && d.remaining > 0)
            .map(|d| {
                d.remaining -= 1;
                d.duration
            });

        let failure = s
            .failures
            .iter_mut()
            .find(|f| f.method == method && f.path == path && f.remaining != Some(0))
            .map(|f| {
                if let Some(remaining) = f.remaining.as_mut() {
                    *remaining -= 1;
                }
                (f.status, f.body.clone())
            });

        (delay, failure)
    };

    if let Some((status, body)) = failure {
        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }
        return (status, Json(body)).into_response();
    }

    // Handle first so the response reflects state at request time.
    let response = next.run(request).await;
    if let Some(duration) = delay {
        tokio::time::sleep(duration).await;
    }
    response
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn ok(data: impl serde::Serialize) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn ok_empty(message: &str) -> Response {
    Json(json!({ "success": true, "message": message })).into_response()
}

// =============================================================================
// Plant handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct PlantFilter {
    search: Option<String>,
    category: Option<String>,
    #[serde(rename = "inStock")]
    in_stock: Option<bool>,
}

async fn list_plants(State(state): State<Shared>, Query(filter): Query<PlantFilter>) -> Response {
    let s = lock(&state);
    let plants: Vec<&Plant> = s
        .plants
        .iter()
        .filter(|p| filter.search.as_deref().is_none_or(|q| p.matches_text(q)))
        .filter(|p| filter.category.as_deref().is_none_or(|c| p.has_category(c)))
        .filter(|p| filter.in_stock != Some(true) || p.is_available)
        .collect();

    let total = u32::try_from(plants.len()).unwrap_or(u32::MAX);
    let pagination = Pagination {
        page: 1,
        limit: total.max(1),
        total,
        pages: 1,
    };
    Json(json!({
        "success": true,
        "data": plants,
        "pagination": pagination,
    }))
    .into_response()
}

async fn get_plant(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let s = lock(&state);
    s.plant(&PlantId::new(id))
        .map_or_else(|| not_found("Plant not found"), ok)
}

async fn create_plant(State(state): State<Shared>, Json(new): Json<NewPlant>) -> Response {
    if new.name.trim().is_empty() || new.categories.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Name and categories are required" })),
        )
            .into_response();
    }

    let mut s = lock(&state);
    s.next_plant += 1;
    let plant = Plant {
        id: PlantId::new(format!("plant-{}", s.next_plant)),
        name: new.name,
        scientific_name: new.scientific_name,
        price: new.price,
        categories: new.categories,
        is_available: new.stock,
        care_level: new.care_level,
        light_requirement: new.light_requirement,
        description: new.description,
        image: new.image,
    };
    s.plants.push(plant.clone());

    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": plant })),
    )
        .into_response()
}

async fn update_plant(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(new): Json<NewPlant>,
) -> Response {
    let mut s = lock(&state);
    let id = PlantId::new(id);
    let Some(plant) = s.plants.iter_mut().find(|p| p.id == id) else {
        return not_found("Plant not found");
    };
    plant.name = new.name;
    plant.scientific_name = new.scientific_name;
    plant.price = new.price;
    plant.categories = new.categories;
    plant.is_available = new.stock;
    plant.care_level = new.care_level;
    plant.light_requirement = new.light_requirement;
    plant.description = new.description;
    plant.image = new.image;
    ok(plant.clone())
}

async fn delete_plant(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut s = lock(&state);
    let id = PlantId::new(id);
    let before = s.plants.len();
    s.plants.retain(|p| p.id != id);
    if s.plants.len() == before {
        return not_found("Plant not found");
    }
    ok_empty("Plant deleted")
}

async fn list_categories(State(state): State<Shared>) -> Response {
    let s = lock(&state);
    let mut categories: Vec<&String> = s.plants.iter().flat_map(|p| &p.categories).collect();
    categories.sort();
    categories.dedup();
    ok(categories)
}

// =============================================================================
// Cart handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct AddLine {
    #[serde(rename = "plantId")]
    plant_id: PlantId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct SetQuantity {
    quantity: u32,
}

async fn get_cart(State(state): State<Shared>, Path(user): Path<String>) -> Response {
    let s = lock(&state);
    let items = s.cart_items(&user);
    let total: u32 = items.iter().map(|i| i.quantity).sum();
    ok(json!({ "items": items, "totalItems": total }))
}

async fn add_to_cart(
    State(state): State<Shared>,
    Path(user): Path<String>,
    Json(line): Json<AddLine>,
) -> Response {
    let mut s = lock(&state);
    if s.plant(&line.plant_id).is_none() {
        return not_found("Plant not found");
    }
    let cart = s.carts.entry(user).or_default();
    match cart.iter_mut().find(|(id, _)| *id == line.plant_id) {
        Some((_, quantity)) => *quantity += line.quantity,
        None => cart.push((line.plant_id, line.quantity)),
    }
    ok_empty("Item added to cart")
}

async fn update_cart_item(
    State(state): State<Shared>,
    Path((user, plant)): Path<(String, String)>,
    Json(body): Json<SetQuantity>,
) -> Response {
    let mut s = lock(&state);
    let plant = PlantId::new(plant);
    let Some((_, quantity)) = s
        .carts
        .get_mut(&user)
        .and_then(|cart| cart.iter_mut().find(|(id, _)| *id == plant))
    else {
        return not_found("Item not found in cart");
    };
    *quantity = body.quantity;
    ok_empty("Cart updated")
}

async fn remove_from_cart(
    State(state): State<Shared>,
    Path((user, plant)): Path<(String, String)>,
) -> Response {
    let mut s = lock(&state);
    let plant = PlantId::new(plant);
    if let Some(cart) = s.carts.get_mut(&user) {
        cart.retain(|(id, _)| *id != plant);
    }
    ok_empty("Item removed from cart")
}

async fn clear_cart(State(state): State<Shared>, Path(user): Path<String>) -> Response {
    lock(&state).carts.remove(&user);
    ok_empty("Cart cleared")
}

// =============================================================================
// Wishlist handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct AddEntry {
    #[serde(rename = "plantId")]
    plant_id: PlantId,
    #[allow(dead_code)]
    notes: Option<String>,
}

async fn get_wishlist(State(state): State<Shared>, Path(user): Path<String>) -> Response {
    let s = lock(&state);
    let plants: Vec<&Plant> = s
        .wishlists
        .get(&user)
        .map(|ids| ids.iter().filter_map(|id| s.plant(id)).collect())
        .unwrap_or_default();
    ok(json!({ "plants": plants }))
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    Path(user): Path<String>,
    Json(entry): Json<AddEntry>,
) -> Response {
    let mut s = lock(&state);
    if s.plant(&entry.plant_id).is_none() {
        return not_found("Plant not found");
    }
    let wishlist = s.wishlists.entry(user).or_default();
    if wishlist.contains(&entry.plant_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Plant already in wishlist" })),
        )
            .into_response();
    }
    wishlist.push(entry.plant_id);
    ok_empty("Added to wishlist")
}

async fn remove_from_wishlist(
    State(state): State<Shared>,
    Path((user, plant)): Path<(String, String)>,
) -> Response {
    let mut s = lock(&state);
    let plant = PlantId::new(plant);
    let Some(wishlist) = s.wishlists.get_mut(&user) else {
        return not_found("Wishlist not found");
    };
    if !wishlist.contains(&plant) {
        return not_found("Plant not in wishlist");
    }
    wishlist.retain(|id| *id != plant);
    ok_empty("Removed from wishlist")
}
