//! REST client for the plant backend.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every response is wrapped in an
//!   envelope whose `data` field carries the payload
//! - The backend is the source of truth - stores re-fetch after mutating
//! - The category list is cached in memory via `moka` for the life of the
//!   client
//! - No retries: a failed call surfaces directly to the caller
//!
//! # Example
//!
//! ```rust,ignore
//! use greenhouse_storefront::api::{PlantApiClient, PlantListParams};
//!
//! let client = PlantApiClient::new(&config.api)?;
//! let page = client.list_plants(&PlantListParams::default()).await?;
//! client.add_to_cart(&user_id, &page.plants[0].id, 1).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::PlantApiClient;
pub use types::{PlantListParams, PlantPage};

use thiserror::Error;

/// Message used when the backend gives no reason for a failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeout or connection failure; the request may not have reached the
    /// backend.
    NetworkFailure,
    /// The backend answered and refused the request.
    ServerError,
}

/// Errors that can occur when talking to the plant backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the server's `message` field when
    /// present.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response whose envelope reported `"success": false`.
    #[error("{0}")]
    Rejected(String),

    /// Response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Envelope had no `data` field where one was required.
    #[error("Response contained no data")]
    MissingData,

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    /// Human-readable message for notifications and inline error states.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Network failure or server error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::Client(_) | Self::InvalidUrl(_) => {
                ErrorKind::NetworkFailure
            }
            Self::Server { .. } | Self::Rejected(_) | Self::Decode(_) | Self::MissingData => {
                ErrorKind::ServerError
            }
        }
    }

    /// HTTP status for server errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_server_message() {
        let err = ApiError::Server {
            status: 404,
            message: "Plant not found".to_string(),
        };
        assert_eq!(err.to_string(), "Plant not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), ErrorKind::ServerError);
    }

    #[test]
    fn test_timeout_is_network_failure() {
        let err = ApiError::Timeout(10);
        assert_eq!(err.message(), "Request timed out after 10 seconds");
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_rejected_uses_envelope_message() {
        let err = ApiError::Rejected("Plant already in wishlist".to_string());
        assert_eq!(err.message(), "Plant already in wishlist");
    }
}
