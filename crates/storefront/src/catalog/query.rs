//! Plant list fetching with loading/error/data state.

use std::sync::{Arc, Mutex};

use greenhouse_core::{Pagination, Plant};
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, PlantApiClient, PlantListParams};
use crate::stores::{FetchGuard, LoadState, lock};

#[derive(Debug, Default)]
struct QueryState {
    plants: Vec<Plant>,
    pagination: Option<Pagination>,
    status: LoadState,
    last_params: Option<PlantListParams>,
    guard: FetchGuard,
}

/// Fetches the plant list and remembers the parameters it used.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PlantQuery {
    inner: Arc<PlantQueryInner>,
}

struct PlantQueryInner {
    client: PlantApiClient,
    initial: PlantListParams,
    state: Mutex<QueryState>,
}

impl std::fmt::Debug for PlantQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantQuery")
            .field("initial", &self.inner.initial)
            .field("status", &lock(&self.inner.state).status)
            .finish_non_exhaustive()
    }
}

impl PlantQuery {
    /// A query whose every fetch starts from `initial`.
    #[must_use]
    pub fn new(client: PlantApiClient, initial: PlantListParams) -> Self {
        Self {
            inner: Arc::new(PlantQueryInner {
                client,
                initial,
                state: Mutex::new(QueryState::default()),
            }),
        }
    }

    /// Fetch with the initial parameters.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request; it is also recorded in
    /// `status()`.
    pub async fn load(&self) -> Result<(), ApiError> {
        self.run(self.inner.initial.clone()).await
    }

    /// Fetch with `overrides` merged over the initial parameters.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    pub async fn refetch(&self, overrides: &PlantListParams) -> Result<(), ApiError> {
        self.run(self.inner.initial.merged_with(overrides)).await
    }

    /// Re-issue the most recent fetch with identical parameters.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    pub async fn retry(&self) -> Result<(), ApiError> {
        let params = lock(&self.inner.state)
            .last_params
            .clone()
            .unwrap_or_else(|| self.inner.initial.clone());
        self.run(params).await
    }

    #[instrument(skip(self))]
    async fn run(&self, params: PlantListParams) -> Result<(), ApiError> {
        let ticket = {
            let mut state = lock(&self.inner.state);
            state.status = LoadState::Loading;
            state.last_params = Some(params.clone());
            state.guard.begin_fetch()
        };

        let result = self.inner.client.list_plants(&params).await;

        let mut state = lock(&self.inner.state);
        if !state.guard.accept(ticket) {
            debug!(ticket, "Discarding stale plant list");
            if state.guard.is_latest_fetch(ticket) && state.status.is_loading() {
                state.status = LoadState::Ready;
            }
            return result.map(|_| ());
        }

        match result {
            Ok(page) => {
                debug!(count = page.plants.len(), "Plant list loaded");
                state.plants = page.plants;
                state.pagination = page.pagination;
                state.status = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Plant list fetch failed");
                state.status = LoadState::Failed(e.message());
                Err(e)
            }
        }
    }

    /// Category labels, fetched once per client and cached.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    pub async fn categories(&self) -> Result<Arc<Vec<String>>, ApiError> {
        self.inner.client.list_categories().await
    }

    #[must_use]
    pub fn plants(&self) -> Vec<Plant> {
        lock(&self.inner.state).plants.clone()
    }

    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        lock(&self.inner.state).pagination
    }

    #[must_use]
    pub fn status(&self) -> LoadState {
        lock(&self.inner.state).status.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.inner.state).status.error().map(str::to_string)
    }

    /// Parameters of the most recent fetch.
    #[must_use]
    pub fn last_params(&self) -> Option<PlantListParams> {
        lock(&self.inner.state).last_params.clone()
    }
}
