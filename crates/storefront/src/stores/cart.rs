//! Cart store.
//!
//! Unlike the wishlist, cart mutations are never applied optimistically:
//! totals come from the backend, so every mutation is followed by a full
//! refetch. The one exception is `clear`, whose result is known.

use std::sync::{Arc, Mutex};

use greenhouse_core::{CartContents, CartLineItem, CartSummary, Plant, PlantId, Price, TaxRate};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::{FetchGuard, LoadState, MutationOutcome, lock};
use crate::api::{ApiError, PlantApiClient};
use crate::identity::IdentityProvider;
use crate::notifications::{Notice, Notifications};

/// Message shown when the user tries to check out.
pub const CHECKOUT_MESSAGE: &str = "Checkout functionality will be implemented soon!";

/// Checkout is not offered by this storefront.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Checkout functionality will be implemented soon!")]
pub struct CheckoutUnavailable;

#[derive(Debug, Default)]
struct CartState {
    contents: CartContents,
    status: LoadState,
    guard: FetchGuard,
}

/// Client-side cache of the cart. Cheap to clone.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    client: PlantApiClient,
    identity: Arc<dyn IdentityProvider>,
    notifications: Notifications,
    tax_rate: TaxRate,
    state: Mutex<CartState>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("CartStore")
            .field("lines", &state.contents.items.len())
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    #[must_use]
    pub fn new(
        client: PlantApiClient,
        identity: Arc<dyn IdentityProvider>,
        notifications: Notifications,
        tax_rate: TaxRate,
    ) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                client,
                identity,
                notifications,
                tax_rate,
                state: Mutex::new(CartState::default()),
            }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether the cart has a line for `plant_id`.
    #[must_use]
    pub fn is_in_cart(&self, plant_id: &PlantId) -> bool {
        lock(&self.inner.state).contents.contains(plant_id)
    }

    /// Snapshot of the cached cart.
    #[must_use]
    pub fn contents(&self) -> CartContents {
        lock(&self.inner.state).contents.clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        lock(&self.inner.state).contents.items.clone()
    }

    /// Badge count: backend `totalItems`, or the sum of quantities.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        lock(&self.inner.state).contents.item_count()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        lock(&self.inner.state).contents.subtotal()
    }

    /// Subtotal, tax and total for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        lock(&self.inner.state).contents.summary(self.inner.tax_rate)
    }

    #[must_use]
    pub fn tax_rate(&self) -> TaxRate {
        self.inner.tax_rate
    }

    #[must_use]
    pub fn status(&self) -> LoadState {
        lock(&self.inner.state).status.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.inner.state).status.error().map(str::to_string)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Replace the cached cart with the backend's.
    ///
    /// On failure the previous lines are kept and the error recorded.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<(), ApiError> {
        let ticket = {
            let mut state = lock(&self.inner.state);
            state.status = LoadState::Loading;
            state.guard.begin_fetch()
        };

        let user = self.inner.identity.current_user_id();
        let result = self.inner.client.get_cart(&user).await;

        let mut state = lock(&self.inner.state);
        let fresh = state.guard.accept(ticket);

        match result {
            Ok(contents) if fresh => {
                debug!(lines = contents.items.len(), "Cart loaded");
                state.contents = contents;
                state.status = LoadState::Ready;
                Ok(())
            }
            Err(e) if fresh => {
                warn!(error = %e, "Cart fetch failed");
                state.status = LoadState::Failed(e.message());
                Err(e)
            }
            result => {
                debug!(ticket, "Discarding stale cart response");
                if state.guard.is_latest_fetch(ticket) && state.status.is_loading() {
                    state.status = LoadState::Ready;
                }
                result.map(|_| ())
            }
        }
    }

    /// Refetch after a mutation. A failure here is already recorded in the
    /// store status and does not undo the mutation.
    async fn refresh(&self) {
        if let Err(e) = self.fetch().await {
            debug!(error = %e, "Cart refresh after mutation failed");
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of a plant (an upsert on the backend), then refetch.
    #[instrument(skip(self, plant), fields(plant_id = %plant.id))]
    pub async fn add(&self, plant: &Plant, quantity: u32) -> MutationOutcome {
        if quantity == 0 {
            return MutationOutcome::failed("Quantity must be at least 1");
        }

        let user = self.inner.identity.current_user_id();
        match self.inner.client.add_to_cart(&user, &plant.id, quantity).await {
            Ok(()) => {
                self.refresh().await;
                self.inner
                    .notifications
                    .notify(Notice::success(format!("{} added to cart!", plant.name)));
                MutationOutcome::ok(format!("{} added to cart!", plant.name))
            }
            Err(e) => self.failed("Failed to add to cart", &e),
        }
    }

    /// Add one unit from a product card: skipped without a request when the
    /// plant is unavailable or already in the cart.
    pub async fn add_from_card(&self, plant: &Plant) -> MutationOutcome {
        if !plant.is_available {
            return MutationOutcome::failed("Unavailable");
        }
        if self.is_in_cart(&plant.id) {
            return MutationOutcome::failed("Already in cart");
        }
        self.add(plant, 1).await
    }

    /// Set a line's quantity. Zero or less removes the line.
    #[instrument(skip(self), fields(plant_id = %plant_id))]
    pub async fn set_quantity(&self, plant_id: &PlantId, quantity: i64) -> MutationOutcome {
        if quantity <= 0 {
            return self.remove(plant_id).await;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let user = self.inner.identity.current_user_id();
        match self
            .inner
            .client
            .update_cart_item(&user, plant_id, quantity)
            .await
        {
            Ok(()) => {
                self.refresh().await;
                MutationOutcome::ok("Quantity updated")
            }
            Err(e) => self.failed("Failed to update quantity", &e),
        }
    }

    /// Remove a line, then refetch.
    #[instrument(skip(self), fields(plant_id = %plant_id))]
    pub async fn remove(&self, plant_id: &PlantId) -> MutationOutcome {
        let user = self.inner.identity.current_user_id();
        match self.inner.client.remove_from_cart(&user, plant_id).await {
            Ok(()) => {
                self.refresh().await;
                self.inner
                    .notifications
                    .notify(Notice::info("Item removed from cart"));
                MutationOutcome::ok("Item removed from cart")
            }
            Err(e) => self.failed("Failed to remove from cart", &e),
        }
    }

    /// Empty the cart. Local state is cleared directly on success.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> MutationOutcome {
        let user = self.inner.identity.current_user_id();
        match self.inner.client.clear_cart(&user).await {
            Ok(()) => {
                {
                    let mut state = lock(&self.inner.state);
                    state.guard.supersede();
                    state.contents = CartContents::from_items(Vec::new());
                    state.status = LoadState::Ready;
                }
                self.inner.notifications.notify(Notice::info("Cart cleared"));
                MutationOutcome::ok("Cart cleared")
            }
            Err(e) => self.failed("Failed to clear cart", &e),
        }
    }

    /// Checkout is a stub.
    ///
    /// # Errors
    ///
    /// Always returns `CheckoutUnavailable`.
    pub fn checkout(&self) -> Result<(), CheckoutUnavailable> {
        self.inner.notifications.notify(Notice::info(CHECKOUT_MESSAGE));
        Err(CheckoutUnavailable)
    }

    fn failed(&self, context: &str, error: &ApiError) -> MutationOutcome {
        warn!(error = %error, "{context}");
        let message = error.message();
        self.inner
            .notifications
            .notify(Notice::error(format!("{context}: {message}")));
        MutationOutcome::failed(message)
    }
}
