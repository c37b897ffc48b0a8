//! Add-plant form state and validation.

use greenhouse_core::{AmountError, CareLevel, LightRequirement, NewPlant, Plant, Price};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, PlantApiClient};
use crate::catalog::PlantQuery;

/// Categories offered as one-click chips.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Indoor",
    "Outdoor",
    "Succulent",
    "Air Purifying",
    "Home Decor",
    "Flowering",
    "Foliage",
    "Medicinal",
];

/// Client-side checks that fail before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingName,
    #[error("Please fill in all required fields")]
    MissingPrice,
    #[error("Please fill in all required fields")]
    NoCategories,
    #[error("Price must be a non-negative number")]
    InvalidPrice(#[from] AmountError),
}

/// Why a submit did not create a plant.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Submit(#[from] ApiError),
}

/// Editable state of the add-plant form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPlantForm {
    pub name: String,
    pub scientific_name: String,
    /// Raw price input; only needs to parse as a number.
    pub price: String,
    pub categories: Vec<String>,
    pub stock: bool,
    pub description: String,
    pub image: String,
    pub care_level: CareLevel,
    pub light_requirement: LightRequirement,
    /// Message from the last failed submit, shown inline.
    pub error: Option<String>,
    open: bool,
}

impl Default for AddPlantForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            scientific_name: String::new(),
            price: String::new(),
            categories: Vec::new(),
            stock: true,
            description: String::new(),
            image: String::new(),
            care_level: CareLevel::Medium,
            light_requirement: LightRequirement::Medium,
            error: None,
            open: false,
        }
    }
}

impl AddPlantForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without submitting. Field values are kept.
    pub fn close(&mut self) {
        self.open = false;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Add a category chip. Blank and duplicate labels are ignored.
    pub fn add_category(&mut self, category: &str) {
        let category = category.trim();
        if category.is_empty() || self.categories.iter().any(|c| c == category) {
            return;
        }
        self.categories.push(category.to_string());
    }

    pub fn remove_category(&mut self, category: &str) {
        self.categories.retain(|c| c != category);
    }

    /// Suggested categories not yet selected.
    #[must_use]
    pub fn remaining_suggestions(&self) -> Vec<&'static str> {
        SUGGESTED_CATEGORIES
            .iter()
            .copied()
            .filter(|s| !self.categories.iter().any(|c| c == s))
            .collect()
    }

    /// Check required fields and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate(&self) -> Result<NewPlant, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.price.trim().is_empty() {
            return Err(ValidationError::MissingPrice);
        }
        if self.categories.is_empty() {
            return Err(ValidationError::NoCategories);
        }
        let price = Price::parse(&self.price)?;

        Ok(NewPlant {
            name: name.to_string(),
            scientific_name: non_blank(&self.scientific_name),
            price,
            categories: self.categories.clone(),
            stock: self.stock,
            description: non_blank(&self.description),
            image: non_blank(&self.image),
            care_level: self.care_level,
            light_requirement: self.light_requirement,
        })
    }

    /// Validate, create the plant, then reload the catalog and reset.
    ///
    /// On failure the form stays open with the message in `error`.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Validation` without making a request, or
    /// `FormError::Submit` if the backend refused the plant.
    #[instrument(skip_all, fields(name = %self.name))]
    pub async fn submit(
        &mut self,
        client: &PlantApiClient,
        catalog: &PlantQuery,
    ) -> Result<Plant, FormError> {
        let new_plant = match self.validate() {
            Ok(plant) => plant,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.error = None;
        let created = match client.create_plant(&new_plant).await {
            Ok(plant) => plant,
            Err(e) => {
                warn!(error = %e, "Failed to create plant");
                self.error = Some(e.message());
                return Err(e.into());
            }
        };
        info!(plant_id = %created.id, "Plant created");

        // The plant exists now; a failed reload shows up on the catalog page.
        if let Err(e) = catalog.load().await {
            warn!(error = %e, "Catalog reload after create failed");
        }

        *self = Self::default();
        Ok(created)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
