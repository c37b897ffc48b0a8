//! Wire types for the plant backend.
//!
//! Domain types (plants, cart contents, wishlist contents) live in
//! `greenhouse-core`; this module holds the envelope and request shapes that
//! only matter on the wire.

use greenhouse_core::{Pagination, Plant, PlantId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope shared by every endpoint: `{ success?, data?, message?,
/// pagination? }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub message: Option<String>,
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// Envelope for an empty 2xx body (e.g. `204 No Content`).
    pub(crate) const fn empty() -> Self {
        Self {
            success: None,
            data: None,
            message: None,
            pagination: None,
        }
    }
}

/// Error body of a non-2xx response. Only `message` is used.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

// =============================================================================
// Plants
// =============================================================================

/// Query parameters for `GET /plants`.
///
/// Unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlantListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "inStock", skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PlantListParams {
    /// `self` with every field that `overrides` sets replaced.
    #[must_use]
    pub fn merged_with(&self, overrides: &Self) -> Self {
        Self {
            search: overrides.search.clone().or_else(|| self.search.clone()),
            category: overrides.category.clone().or_else(|| self.category.clone()),
            in_stock: overrides.in_stock.or(self.in_stock),
            page: overrides.page.or(self.page),
            limit: overrides.limit.or(self.limit),
        }
    }
}

/// One page of `GET /plants`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantPage {
    pub plants: Vec<Plant>,
    pub pagination: Option<Pagination>,
}

// =============================================================================
// Cart
// =============================================================================

/// Body of `POST /cart/:userId`.
#[derive(Debug, Serialize)]
pub(crate) struct AddToCartBody<'a> {
    #[serde(rename = "plantId")]
    pub plant_id: &'a PlantId,
    pub quantity: u32,
}

/// Body of `PUT /cart/:userId/:plantId`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateQuantityBody {
    pub quantity: u32,
}
