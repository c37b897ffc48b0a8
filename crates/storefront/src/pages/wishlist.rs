//! Wishlist screen.

use std::sync::{Arc, Mutex};

use greenhouse_core::{Plant, PlantId};
use tracing::instrument;

use crate::api::ApiError;
use crate::stores::{CartStore, MutationOutcome, WishlistStore, lock};

/// Wishlist screen: full plant details for every wishlisted id.
#[derive(Debug, Clone)]
pub struct WishlistPage {
    wishlist: WishlistStore,
    cart: CartStore,
    plants: Arc<Mutex<Vec<Plant>>>,
}

impl WishlistPage {
    #[must_use]
    pub fn new(wishlist: WishlistStore, cart: CartStore) -> Self {
        Self {
            wishlist,
            cart,
            plants: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fetch plant details (and reconcile membership).
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request; the list is emptied.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ApiError> {
        let result = self.wishlist.plants().await;
        let mut plants = lock(&self.plants);
        match result {
            Ok(fetched) => {
                *plants = fetched;
                Ok(())
            }
            Err(e) => {
                plants.clear();
                Err(e)
            }
        }
    }

    /// Re-fetch both the membership set and the detail list.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` encountered.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let membership = self.wishlist.fetch().await;
        let details = self.load().await;
        membership.and(details)
    }

    /// Plants currently shown.
    #[must_use]
    pub fn plants(&self) -> Vec<Plant> {
        lock(&self.plants).clone()
    }

    /// Whether a plant's "Add to Cart" button should be active.
    #[must_use]
    pub fn can_add_to_cart(&self, plant: &Plant) -> bool {
        plant.is_available && !self.cart.is_in_cart(&plant.id)
    }

    /// Remove an entry; the card disappears as soon as the backend accepts.
    pub async fn remove(&self, plant_id: &PlantId) -> MutationOutcome {
        let outcome = self.wishlist.remove(plant_id).await;
        if outcome.success {
            lock(&self.plants).retain(|p| &p.id != plant_id);
        }
        outcome
    }

    /// Add one unit of an available plant not yet in the cart.
    pub async fn add_to_cart(&self, plant: &Plant) -> MutationOutcome {
        self.cart.add_from_card(plant).await
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.plants).is_empty()
    }
}
