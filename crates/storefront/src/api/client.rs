//! Plant backend client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches the category list using `moka`.

use std::sync::Arc;

use greenhouse_core::{
    AddToWishlist, CartContents, NewPlant, Plant, PlantId, UserId, WishlistContents,
};
use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument, warn};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::types::{
    AddToCartBody, Envelope, ErrorBody, PlantListParams, PlantPage, UpdateQuantityBody,
};
use super::{ApiError, GENERIC_ERROR_MESSAGE};
use crate::config::ApiConfig;

/// Longest body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// PlantApiClient
// =============================================================================

/// Client for the plant backend REST API.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct PlantApiClient {
    inner: Arc<PlantApiClientInner>,
}

struct PlantApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for PlantApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PlantApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("greenhouse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        // Nothing evicts categories except explicit invalidation.
        let cache = Cache::builder().max_capacity(16).build();

        Ok(Self {
            inner: Arc::new(PlantApiClientInner {
                client,
                base_url: config.base_url.clone(),
                timeout_secs: config.timeout.as_secs(),
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// The configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode the response envelope.
    ///
    /// Non-2xx responses and `"success": false` envelopes become errors.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            warn!(
                status = %status,
                body = %truncate(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Envelope::empty());
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %truncate(&body), "Failed to decode backend response");
            ApiError::Decode(e.to_string())
        })?;

        if envelope.success == Some(false) {
            let message = envelope
                .message
                .clone()
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            debug!(message = %message, "Backend rejected request");
            return Err(ApiError::Rejected(message));
        }

        Ok(envelope)
    }

    /// Send a request and return the envelope's `data`.
    async fn fetch_data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.execute::<T>(builder)
            .await?
            .data
            .ok_or(ApiError::MissingData)
    }

    /// Send a request whose response payload is irrelevant.
    async fn send_command(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.execute::<IgnoredAny>(builder).await.map(|_| ())
    }

    fn transport_error(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.inner.timeout_secs)
        } else if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }

    // =========================================================================
    // Plant Methods
    // =========================================================================

    /// List plants matching `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn list_plants(&self, params: &PlantListParams) -> Result<PlantPage, ApiError> {
        let url = self.url(&["plants"])?;
        let envelope = self
            .execute::<Vec<Plant>>(self.request(Method::GET, url).query(params))
            .await?;

        let plants = envelope.data.unwrap_or_default();
        debug!(count = plants.len(), "Fetched plants");

        Ok(PlantPage {
            plants,
            pagination: envelope.pagination,
        })
    }

    /// Get a single plant.
    ///
    /// # Errors
    ///
    /// Returns an error if the plant does not exist or the request fails.
    #[instrument(skip(self), fields(plant_id = %id))]
    pub async fn get_plant(&self, id: &PlantId) -> Result<Plant, ApiError> {
        let url = self.url(&["plants", id.as_str()])?;
        self.fetch_data(self.request(Method::GET, url)).await
    }

    /// Create a plant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the plant or the request fails.
    #[instrument(skip(self, plant), fields(name = %plant.name))]
    pub async fn create_plant(&self, plant: &NewPlant) -> Result<Plant, ApiError> {
        let url = self.url(&["plants"])?;
        let created = self
            .fetch_data(self.request(Method::POST, url).json(plant))
            .await?;
        self.invalidate_categories().await;
        Ok(created)
    }

    /// Replace a plant's attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the request fails.
    #[instrument(skip(self, plant), fields(plant_id = %id))]
    pub async fn update_plant(&self, id: &PlantId, plant: &NewPlant) -> Result<Plant, ApiError> {
        let url = self.url(&["plants", id.as_str()])?;
        let updated = self
            .fetch_data(self.request(Method::PUT, url).json(plant))
            .await?;
        self.invalidate_categories().await;
        Ok(updated)
    }

    /// Delete a plant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the request fails.
    #[instrument(skip(self), fields(plant_id = %id))]
    pub async fn delete_plant(&self, id: &PlantId) -> Result<(), ApiError> {
        let url = self.url(&["plants", id.as_str()])?;
        self.send_command(self.request(Method::DELETE, url)).await?;
        self.invalidate_categories().await;
        Ok(())
    }

    /// Get all category labels. Cached after the first successful call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<String>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.url(&["plants", "categories", "list"])?;
        let categories: Vec<String> = self.fetch_data(self.request(Method::GET, url)).await?;
        let categories = Arc::new(categories);

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    async fn invalidate_categories(&self) {
        self.inner.cache.invalidate(&CacheKey::Categories).await;
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the cart for `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn get_cart(&self, user: &UserId) -> Result<CartContents, ApiError> {
        let url = self.url(&["cart", user.as_str()])?;
        let contents: CartContents = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(contents.normalized())
    }

    /// Add `quantity` of a plant to the cart (upsert on the backend).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the line or the request fails.
    #[instrument(skip(self), fields(user = %user, plant_id = %plant_id))]
    pub async fn add_to_cart(
        &self,
        user: &UserId,
        plant_id: &PlantId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.url(&["cart", user.as_str()])?;
        let body = AddToCartBody { plant_id, quantity };
        self.send_command(self.request(Method::POST, url).json(&body))
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the request fails.
    #[instrument(skip(self), fields(user = %user, plant_id = %plant_id))]
    pub async fn update_cart_item(
        &self,
        user: &UserId,
        plant_id: &PlantId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let url = self.url(&["cart", user.as_str(), plant_id.as_str()])?;
        let body = UpdateQuantityBody { quantity };
        self.send_command(self.request(Method::PUT, url).json(&body))
            .await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user = %user, plant_id = %plant_id))]
    pub async fn remove_from_cart(&self, user: &UserId, plant_id: &PlantId) -> Result<(), ApiError> {
        let url = self.url(&["cart", user.as_str(), plant_id.as_str()])?;
        self.send_command(self.request(Method::DELETE, url)).await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn clear_cart(&self, user: &UserId) -> Result<(), ApiError> {
        let url = self.url(&["cart", user.as_str()])?;
        self.send_command(self.request(Method::DELETE, url)).await
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Get the wishlist for `user`, with full plant details.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn get_wishlist(&self, user: &UserId) -> Result<WishlistContents, ApiError> {
        let url = self.url(&["wishlist", user.as_str()])?;
        // A wishlist that was never written may come back without `data`.
        let envelope = self
            .execute::<WishlistContents>(self.request(Method::GET, url))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Add a plant to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the entry or the request fails.
    #[instrument(skip(self, entry), fields(user = %user, plant_id = %entry.plant_id))]
    pub async fn add_to_wishlist(&self, user: &UserId, entry: &AddToWishlist) -> Result<(), ApiError> {
        let url = self.url(&["wishlist", user.as_str()])?;
        self.send_command(self.request(Method::POST, url).json(entry))
            .await
    }

    /// Remove a plant from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal or the request fails.
    #[instrument(skip(self), fields(user = %user, plant_id = %plant_id))]
    pub async fn remove_from_wishlist(
        &self,
        user: &UserId,
        plant_id: &PlantId,
    ) -> Result<(), ApiError> {
        let url = self.url(&["wishlist", user.as_str(), plant_id.as_str()])?;
        self.send_command(self.request(Method::DELETE, url)).await
    }
}

/// First `LOG_BODY_LIMIT` characters of a response body.
fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> PlantApiClient {
        PlantApiClient::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_url_appends_segments_to_base_path() {
        let client = client("http://localhost:5000/api");
        let url = client.url(&["plants", "categories", "list"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/plants/categories/list");
    }

    #[test]
    fn test_url_handles_trailing_slash() {
        let client = client("http://localhost:5000/api/");
        let url = client.url(&["cart", "user-1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/cart/user-1");
    }

    #[test]
    fn test_url_encodes_ids() {
        let client = client("http://localhost:5000/api");
        let url = client.url(&["wishlist", "user 1", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/wishlist/user%201/a%2Fb");
    }

    #[test]
    fn test_truncate_limits_length() {
        let long = "x".repeat(LOG_BODY_LIMIT * 2);
        assert_eq!(truncate(&long).len(), LOG_BODY_LIMIT);
    }
}
