//! Wishlist store.
//!
//! Holds the set of wishlisted plant ids for the current identity. Adds and
//! removes are applied locally as soon as the backend accepts them, marked
//! pending, and confirmed by a delayed refetch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use greenhouse_core::{AddToWishlist, Plant, PlantId, WishlistContents};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use super::{FetchGuard, LoadState, MutationOutcome, lock};
use crate::api::{ApiError, PlantApiClient};
use crate::identity::IdentityProvider;
use crate::notifications::{Notice, Notifications};

/// One wishlisted plant as the store sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Membership {
    plant_id: PlantId,
    /// Set by an optimistic add, cleared by the next applied fetch.
    pending: bool,
}

#[derive(Debug, Default)]
struct WishlistState {
    members: Vec<Membership>,
    status: LoadState,
    guard: FetchGuard,
}

/// Client-side cache of the wishlist. Cheap to clone.
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<WishlistStoreInner>,
}

struct WishlistStoreInner {
    client: PlantApiClient,
    identity: Arc<dyn IdentityProvider>,
    notifications: Notifications,
    refetch_delay: Duration,
    state: Mutex<WishlistState>,
    refetches: Mutex<JoinSet<()>>,
    /// Bumped by `shutdown`; refetches spawned earlier stop when it changes.
    cancel: watch::Sender<u64>,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("WishlistStore")
            .field("members", &state.members.len())
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl WishlistStore {
    #[must_use]
    pub fn new(
        client: PlantApiClient,
        identity: Arc<dyn IdentityProvider>,
        notifications: Notifications,
        refetch_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(WishlistStoreInner {
                client,
                identity,
                notifications,
                refetch_delay,
                state: Mutex::new(WishlistState::default()),
                refetches: Mutex::new(JoinSet::new()),
                cancel: watch::Sender::new(0),
            }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `plant_id` is on the wishlist (including unconfirmed adds).
    #[must_use]
    pub fn is_member(&self, plant_id: &PlantId) -> bool {
        lock(&self.inner.state)
            .members
            .iter()
            .any(|m| &m.plant_id == plant_id)
    }

    /// Whether `plant_id` was added locally and not yet confirmed by a fetch.
    #[must_use]
    pub fn is_pending(&self, plant_id: &PlantId) -> bool {
        lock(&self.inner.state)
            .members
            .iter()
            .any(|m| &m.plant_id == plant_id && m.pending)
    }

    /// Wishlisted ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<PlantId> {
        lock(&self.inner.state)
            .members
            .iter()
            .map(|m| m.plant_id.clone())
            .collect()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        lock(&self.inner.state).members.len()
    }

    #[must_use]
    pub fn status(&self) -> LoadState {
        lock(&self.inner.state).status.clone()
    }

    /// Error message recorded by the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.inner.state).status.error().map(str::to_string)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Replace the membership set with the backend's wishlist.
    ///
    /// On failure the set is emptied and the error recorded.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<(), ApiError> {
        self.load().await.map(|_| ())
    }

    /// Fetch the wishlist with full plant details for display.
    ///
    /// Reconciles the membership set as a side effect, exactly like `fetch`.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    #[instrument(skip(self))]
    pub async fn plants(&self) -> Result<Vec<Plant>, ApiError> {
        self.load().await.map(|contents| contents.plants)
    }

    async fn load(&self) -> Result<WishlistContents, ApiError> {
        let ticket = {
            let mut state = lock(&self.inner.state);
            state.status = LoadState::Loading;
            state.guard.begin_fetch()
        };

        let user = self.inner.identity.current_user_id();
        let result = self.inner.client.get_wishlist(&user).await;

        let mut state = lock(&self.inner.state);
        let fresh = state.guard.accept(ticket);

        match &result {
            Ok(contents) if fresh => {
                state.members = contents
                    .plant_ids()
                    .into_iter()
                    .map(|plant_id| Membership {
                        plant_id,
                        pending: false,
                    })
                    .collect();
                state.status = LoadState::Ready;
                debug!(count = state.members.len(), "Wishlist loaded");
            }
            Err(e) if fresh => {
                warn!(error = %e, "Wishlist fetch failed");
                state.members.clear();
                state.status = LoadState::Failed(e.message());
            }
            _ => {
                debug!(ticket, "Discarding stale wishlist response");
                if state.guard.is_latest_fetch(ticket) && state.status.is_loading() {
                    state.status = LoadState::Ready;
                }
            }
        }

        result
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a plant. No-op if it is already a member.
    #[instrument(skip(self, plant), fields(plant_id = %plant.id))]
    pub async fn add(&self, plant: &Plant) -> MutationOutcome {
        if self.is_member(&plant.id) {
            return MutationOutcome::ok("Already in wishlist");
        }

        let user = self.inner.identity.current_user_id();
        let entry = AddToWishlist::for_plant(plant);

        match self.inner.client.add_to_wishlist(&user, &entry).await {
            Ok(()) => {
                {
                    let mut state = lock(&self.inner.state);
                    state.guard.supersede();
                    if !state.members.iter().any(|m| m.plant_id == plant.id) {
                        state.members.push(Membership {
                            plant_id: plant.id.clone(),
                            pending: true,
                        });
                    }
                }
                self.inner
                    .notifications
                    .notify(Notice::success(format!("{} added to wishlist!", plant.name)));
                self.schedule_refetch();
                MutationOutcome::ok("Added to wishlist!")
            }
            Err(e) => {
                warn!(error = %e, "Add to wishlist failed");
                let message = e.message();
                self.inner.notifications.notify(Notice::error(format!(
                    "Failed to add to wishlist: {message}"
                )));
                MutationOutcome::failed(message)
            }
        }
    }

    /// Remove a plant. The request is sent even if the plant is not a
    /// local member, since local state may be behind the backend.
    #[instrument(skip(self), fields(plant_id = %plant_id))]
    pub async fn remove(&self, plant_id: &PlantId) -> MutationOutcome {
        let user = self.inner.identity.current_user_id();

        match self.inner.client.remove_from_wishlist(&user, plant_id).await {
            Ok(()) => {
                {
                    let mut state = lock(&self.inner.state);
                    state.guard.supersede();
                    state.members.retain(|m| &m.plant_id != plant_id);
                }
                self.inner
                    .notifications
                    .notify(Notice::info("Removed from wishlist"));
                self.schedule_refetch();
                MutationOutcome::ok("Removed from wishlist!")
            }
            Err(e) => {
                warn!(error = %e, "Remove from wishlist failed");
                let message = e.message();
                self.inner.notifications.notify(Notice::error(format!(
                    "Failed to remove from wishlist: {message}"
                )));
                MutationOutcome::failed(message)
            }
        }
    }

    /// Add the plant if absent, remove it if present.
    pub async fn toggle(&self, plant: &Plant) -> MutationOutcome {
        if self.is_member(&plant.id) {
            self.remove(&plant.id).await
        } else {
            self.add(plant).await
        }
    }

    // =========================================================================
    // Confirmatory refetches
    // =========================================================================

    fn schedule_refetch(&self) {
        let store = self.clone();
        let delay = self.inner.refetch_delay;
        let mut cancelled = self.inner.cancel.subscribe();

        let mut refetches = lock(&self.inner.refetches);
        while refetches.try_join_next().is_some() {}
        refetches.spawn(async move {
            let refetch = async {
                tokio::time::sleep(delay).await;
                if let Err(e) = store.fetch().await {
                    debug!(error = %e, "Confirmatory wishlist refetch failed");
                }
            };
            tokio::select! {
                _ = cancelled.changed() => debug!("Confirmatory wishlist refetch cancelled"),
                () = refetch => {}
            }
        });
    }

    /// Wait for every scheduled confirmatory refetch to finish.
    pub async fn flush_pending(&self) {
        loop {
            let mut refetches = std::mem::take(&mut *lock(&self.inner.refetches));
            if refetches.is_empty() {
                return;
            }
            while let Some(result) = refetches.join_next().await {
                if let Err(e) = result {
                    debug!(error = %e, "Wishlist refetch task ended abnormally");
                }
            }
        }
    }

    /// Abort every scheduled confirmatory refetch, including those a
    /// concurrent `flush_pending` is waiting on.
    pub fn shutdown(&self) {
        self.inner
            .cancel
            .send_modify(|epoch| *epoch = epoch.wrapping_add(1));
        lock(&self.inner.refetches).abort_all();
    }
}
