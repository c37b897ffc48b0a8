//! Catalog grid composed from the plant query and both stores.

use greenhouse_core::Plant;

use super::filter::CatalogFilter;
use super::query::PlantQuery;
use crate::api::ApiError;
use crate::stores::{CartStore, LoadState, MutationOutcome, WishlistStore};

/// One card in the catalog grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantCardView {
    pub plant: Plant,
    pub wishlisted: bool,
    pub in_cart: bool,
}

impl PlantCardView {
    /// Label for the card's cart button.
    #[must_use]
    pub const fn cart_label(&self) -> &'static str {
        if !self.plant.is_available {
            "Unavailable"
        } else if self.in_cart {
            "In Cart"
        } else {
            "Add to Cart"
        }
    }

    #[must_use]
    pub const fn stock_label(&self) -> &'static str {
        if self.plant.is_available {
            "In Stock"
        } else {
            "Out of Stock"
        }
    }
}

/// What the catalog shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPage {
    Loading,
    /// The plant list could not be fetched; offer a retry.
    Error { message: String },
    Ready {
        cards: Vec<PlantCardView>,
        plants_found: usize,
        wishlist_count: usize,
        cart_count: u32,
    },
}

/// The catalog screen: plant grid, filter and per-card actions.
#[derive(Debug, Clone)]
pub struct CatalogView {
    query: PlantQuery,
    wishlist: WishlistStore,
    cart: CartStore,
    pub filter: CatalogFilter,
}

impl CatalogView {
    #[must_use]
    pub fn new(query: PlantQuery, wishlist: WishlistStore, cart: CartStore) -> Self {
        Self {
            query,
            wishlist,
            cart,
            filter: CatalogFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: CatalogFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fetch the unfiltered plant list.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request; the page shows it too.
    pub async fn load(&self) -> Result<(), ApiError> {
        self.query.load().await
    }

    /// Re-issue the last plant list fetch after an error.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    pub async fn retry(&self) -> Result<(), ApiError> {
        self.query.retry().await
    }

    /// Render the current state.
    #[must_use]
    pub fn page(&self) -> CatalogPage {
        match self.query.status() {
            LoadState::Idle | LoadState::Loading => CatalogPage::Loading,
            LoadState::Failed(message) => CatalogPage::Error { message },
            LoadState::Ready => {
                let plants = self.query.plants();
                let cards: Vec<PlantCardView> = self
                    .filter
                    .apply(&plants)
                    .into_iter()
                    .map(|plant| PlantCardView {
                        wishlisted: self.wishlist.is_member(&plant.id),
                        in_cart: self.cart.is_in_cart(&plant.id),
                        plant: plant.clone(),
                    })
                    .collect();

                CatalogPage::Ready {
                    plants_found: cards.len(),
                    cards,
                    wishlist_count: self.wishlist.count(),
                    cart_count: self.cart.cart_count(),
                }
            }
        }
    }

    pub async fn toggle_wishlist(&self, plant: &Plant) -> MutationOutcome {
        self.wishlist.toggle(plant).await
    }

    /// Card "Add to Cart": ignored for unavailable plants and plants
    /// already in the cart.
    pub async fn add_to_cart(&self, plant: &Plant) -> MutationOutcome {
        self.cart.add_from_card(plant).await
    }

    #[must_use]
    pub const fn query(&self) -> &PlantQuery {
        &self.query
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use greenhouse_core::{CareLevel, LightRequirement, PlantId, Price, TaxRate};

    use super::*;
    use crate::api::{PlantApiClient, PlantListParams};
    use crate::config::ApiConfig;
    use crate::identity::StaticIdentity;
    use crate::notifications::Notifications;

    fn plant(available: bool) -> Plant {
        Plant {
            id: PlantId::new("p1"),
            name: "Fern".to_string(),
            scientific_name: None,
            price: Price::from(50),
            categories: vec!["Foliage".to_string()],
            is_available: available,
            care_level: CareLevel::Easy,
            light_requirement: LightRequirement::Low,
            description: None,
            image: None,
        }
    }

    #[test]
    fn test_card_labels() {
        let card = PlantCardView {
            plant: plant(true),
            wishlisted: false,
            in_cart: false,
        };
        assert_eq!(card.cart_label(), "Add to Cart");
        assert_eq!(card.stock_label(), "In Stock");

        let card = PlantCardView { in_cart: true, ..card };
        assert_eq!(card.cart_label(), "In Cart");

        let card = PlantCardView {
            plant: plant(false),
            wishlisted: false,
            in_cart: false,
        };
        assert_eq!(card.cart_label(), "Unavailable");
        assert_eq!(card.stock_label(), "Out of Stock");
    }

    #[tokio::test]
    async fn test_page_is_loading_before_first_fetch() {
        let client = PlantApiClient::new(&ApiConfig::new("http://127.0.0.1:9/api").unwrap()).unwrap();
        let identity = Arc::new(StaticIdentity::new("user-test"));
        let notifications = Notifications::new();
        let view = CatalogView::new(
            PlantQuery::new(client.clone(), PlantListParams::default()),
            WishlistStore::new(
                client.clone(),
                identity.clone(),
                notifications.clone(),
                Duration::ZERO,
            ),
            CartStore::new(client, identity, notifications, TaxRate::default()),
        );

        assert_eq!(view.page(), CatalogPage::Loading);
    }
}
