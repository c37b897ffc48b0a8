//! Per-user session: one client, one identity and one of each store.

use std::sync::Arc;

use greenhouse_core::UserId;
use tracing::{info, instrument, warn};

use crate::api::{PlantApiClient, PlantListParams};
use crate::catalog::{CatalogView, PlantQuery};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::identity::{FileIdentity, IdentityProvider};
use crate::notifications::Notifications;
use crate::pages::{CartPage, WishlistPage};
use crate::stores::{CartStore, WishlistStore};

/// Everything a front end needs for one user.
///
/// Cheaply cloneable via `Arc`. Build one per session and call
/// [`Session::shutdown`] when done.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: StorefrontConfig,
    client: PlantApiClient,
    identity: Arc<dyn IdentityProvider>,
    notifications: Notifications,
    wishlist: WishlistStore,
    cart: CartStore,
    plants: PlantQuery,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.inner.identity.current_user_id())
            .field("client", &self.inner.client)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session using the identity file from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity file cannot be read or created, or
    /// the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let identity = FileIdentity::load_or_create(&config.identity_file)?;
        Self::with_identity(config, Arc::new(identity))
    }

    /// Create a session with a caller-supplied identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_identity(
        config: StorefrontConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppError> {
        let client = PlantApiClient::new(&config.api)?;
        let notifications = Notifications::new();

        let wishlist = WishlistStore::new(
            client.clone(),
            Arc::clone(&identity),
            notifications.clone(),
            config.refetch_delay,
        );
        let cart = CartStore::new(
            client.clone(),
            Arc::clone(&identity),
            notifications.clone(),
            config.tax_rate,
        );
        let plants = PlantQuery::new(client.clone(), PlantListParams::default());

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                identity,
                notifications,
                wishlist,
                cart,
                plants,
            }),
        })
    }

    /// Run the initial wishlist and cart fetches.
    ///
    /// Failures are recorded in each store's status rather than returned;
    /// a session with an unreachable backend is still usable.
    #[instrument(skip(self), fields(user = %self.user_id()))]
    pub async fn start(&self) {
        let (wishlist, cart) = tokio::join!(self.inner.wishlist.fetch(), self.inner.cart.fetch());
        if let Err(e) = wishlist {
            warn!(error = %e, "Initial wishlist fetch failed");
        }
        if let Err(e) = cart {
            warn!(error = %e, "Initial cart fetch failed");
        }
        info!(
            wishlist = self.inner.wishlist.count(),
            cart = self.inner.cart.cart_count(),
            "Session started"
        );
    }

    /// Wait for background refetches, then stop scheduling new ones.
    pub async fn shutdown(&self) {
        self.inner.wishlist.flush_pending().await;
        self.inner.wishlist.shutdown();
    }

    /// Abort background refetches without waiting.
    pub fn abort(&self) {
        self.inner.wishlist.shutdown();
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn client(&self) -> &PlantApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.inner.identity.current_user_id()
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.inner.notifications
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn plants(&self) -> &PlantQuery {
        &self.inner.plants
    }

    /// Catalog screen bound to this session's stores.
    #[must_use]
    pub fn catalog(&self) -> CatalogView {
        CatalogView::new(
            self.inner.plants.clone(),
            self.inner.wishlist.clone(),
            self.inner.cart.clone(),
        )
    }

    #[must_use]
    pub fn cart_page(&self) -> CartPage {
        CartPage::new(self.inner.cart.clone())
    }

    #[must_use]
    pub fn wishlist_page(&self) -> WishlistPage {
        WishlistPage::new(self.inner.wishlist.clone(), self.inner.cart.clone())
    }
}
