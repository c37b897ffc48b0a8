//! In-memory catalog filter.

use greenhouse_core::Plant;

/// Search text, category and stock filter applied to the fetched catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring over name and scientific name.
    pub search: String,
    /// Exact category label; `None` means every category.
    pub category: Option<String>,
    /// Hide plants that are not available.
    pub in_stock_only: bool,
}

impl CatalogFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Restrict to a category. An empty label clears the restriction.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.trim().is_empty()).then_some(category);
        self
    }

    #[must_use]
    pub const fn in_stock_only(mut self, in_stock_only: bool) -> Self {
        self.in_stock_only = in_stock_only;
        self
    }

    /// Whether `plant` passes every active criterion.
    #[must_use]
    pub fn matches(&self, plant: &Plant) -> bool {
        plant.matches_text(&self.search)
            && self
                .category
                .as_deref()
                .is_none_or(|category| plant.has_category(category))
            && (!self.in_stock_only || plant.is_available)
    }

    /// Plants passing the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, plants: &'a [Plant]) -> Vec<&'a Plant> {
        plants.iter().filter(|p| self.matches(p)).collect()
    }
}
