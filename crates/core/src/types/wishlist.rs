//! Wishlist types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PlantId;
use super::plant::Plant;

/// A plant marked as interesting by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(rename = "plantId")]
    pub plant_id: PlantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

/// Payload of `GET /wishlist/:userId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WishlistContents {
    #[serde(default)]
    pub plants: Vec<Plant>,
}

impl WishlistContents {
    /// Identifiers of the wishlisted plants, in backend order.
    #[must_use]
    pub fn plant_ids(&self) -> Vec<PlantId> {
        self.plants.iter().map(|p| p.id.clone()).collect()
    }
}

/// Body of `POST /wishlist/:userId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToWishlist {
    #[serde(rename = "plantId")]
    pub plant_id: PlantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AddToWishlist {
    /// Request body with the default note ("Added <name> to wishlist").
    #[must_use]
    pub fn for_plant(plant: &Plant) -> Self {
        Self {
            plant_id: plant.id.clone(),
            notes: Some(format!("Added {} to wishlist", plant.name)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_ids_keep_backend_order() {
        let contents: WishlistContents = serde_json::from_value(serde_json::json!({
            "plants": [
                {"_id": "b", "name": "B", "price": 1, "categories": ["Indoor"]},
                {"_id": "a", "name": "A", "price": 2, "categories": ["Outdoor"]}
            ]
        }))
        .unwrap();
        assert_eq!(
            contents.plant_ids(),
            vec![PlantId::new("b"), PlantId::new("a")]
        );
    }

    #[test]
    fn test_entry_round_trips_timestamp() {
        let entry: WishlistEntry = serde_json::from_value(serde_json::json!({
            "plantId": "p1",
            "notes": "for the balcony",
            "addedAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.plant_id.as_str(), "p1");
        assert_eq!(entry.notes.as_deref(), Some("for the balcony"));
    }
}
