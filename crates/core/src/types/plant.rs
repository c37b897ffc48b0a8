//! Plant catalog types.
//!
//! The client never owns an authoritative plant: every [`Plant`] is a
//! projection of the backend record, decoded from its JSON wire format.

use serde::{Deserialize, Serialize};

use super::id::PlantId;
use super::price::Price;

// =============================================================================
// Enums
// =============================================================================

/// How much attention a plant needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CareLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// How much light a plant needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LightRequirement {
    Low,
    #[default]
    Medium,
    High,
}

macro_rules! impl_level_str {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Display label, identical to the wire value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::core::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unknown {}: {s}", stringify!($ty)))
            }
        }
    };
}

impl_level_str!(CareLevel { Easy => "Easy", Medium => "Medium", Hard => "Hard" });
impl_level_str!(LightRequirement { Low => "Low", Medium => "Medium", High => "High" });

// =============================================================================
// Plant
// =============================================================================

/// A catalog plant as returned by `GET /plants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    /// Backend identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: PlantId,
    /// Common name.
    pub name: String,
    /// Botanical name.
    #[serde(
        rename = "scientificName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scientific_name: Option<String>,
    /// Unit price.
    pub price: Price,
    /// Category labels (e.g., "Indoor", "Succulent").
    #[serde(default)]
    pub categories: Vec<String>,
    /// Whether the plant can currently be bought.
    #[serde(rename = "isAvailable", alias = "stock", default = "default_true")]
    pub is_available: bool,
    /// Care difficulty.
    #[serde(alias = "careLevel", default)]
    pub care_level: CareLevel,
    /// Light needs.
    #[serde(alias = "lightRequirement", default)]
    pub light_requirement: LightRequirement,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Plant {
    /// Whether the plant carries `category` (exact, case-sensitive match).
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Case-insensitive substring match over name and scientific name.
    ///
    /// An empty needle matches every plant.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .scientific_name
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
    }
}

/// Body of `POST /plants` and `PUT /plants/:id`.
///
/// Field names follow the backend's create endpoint, which differs from the
/// read model (`stock` instead of `isAvailable`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    #[serde(
        rename = "scientificName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scientific_name: Option<String>,
    pub price: Price,
    pub categories: Vec<String>,
    pub stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub care_level: CareLevel,
    pub light_requirement: LightRequirement,
}

/// Pagination metadata that may accompany a plant listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub pages: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "_id": "p1",
            "name": "Snake Plant",
            "scientificName": "Sansevieria trifasciata",
            "price": 199,
            "categories": ["Indoor", "Air Purifying"],
            "isAvailable": true,
            "care_level": "Easy",
            "light_requirement": "Low"
        })
    }

    #[test]
    fn test_plant_decodes_wire_format() {
        let plant: Plant = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(plant.id.as_str(), "p1");
        assert_eq!(plant.price, Price::from(199));
        assert_eq!(plant.care_level, CareLevel::Easy);
        assert_eq!(plant.light_requirement, LightRequirement::Low);
        assert!(plant.description.is_none());
    }

    #[test]
    fn test_plant_defaults_when_fields_missing() {
        let plant: Plant = serde_json::from_value(serde_json::json!({
            "id": "p2",
            "name": "Fern",
            "price": "75.5",
            "categories": ["Foliage"],
            "lightRequirement": "High"
        }))
        .unwrap();
        assert!(plant.is_available);
        assert_eq!(plant.care_level, CareLevel::Medium);
        assert_eq!(plant.light_requirement, LightRequirement::High);
    }

    #[test]
    fn test_matches_text_checks_both_names() {
        let plant: Plant = serde_json::from_value(sample_json()).unwrap();
        assert!(plant.matches_text("snake"));
        assert!(plant.matches_text("TRIFASC"));
        assert!(plant.matches_text(""));
        assert!(!plant.matches_text("cactus"));
    }

    #[test]
    fn test_has_category_is_exact() {
        let plant: Plant = serde_json::from_value(sample_json()).unwrap();
        assert!(plant.has_category("Indoor"));
        assert!(!plant.has_category("indoor"));
    }

    #[test]
    fn test_level_from_str_ignores_case() {
        assert_eq!("hard".parse::<CareLevel>().unwrap(), CareLevel::Hard);
        assert_eq!(
            "LOW".parse::<LightRequirement>().unwrap(),
            LightRequirement::Low
        );
        assert!("extreme".parse::<CareLevel>().is_err());
    }

    #[test]
    fn test_new_plant_uses_create_field_names() {
        let body = NewPlant {
            name: "Aloe".to_string(),
            scientific_name: None,
            price: Price::from(150),
            categories: vec!["Succulent".to_string()],
            stock: true,
            description: None,
            image: None,
            care_level: CareLevel::Easy,
            light_requirement: LightRequirement::High,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stock"], true);
        assert_eq!(json["care_level"], "Easy");
        assert_eq!(json["light_requirement"], "High");
        assert!(json.get("scientificName").is_none());
    }
}
