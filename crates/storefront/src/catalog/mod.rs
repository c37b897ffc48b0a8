//! Plant catalog: fetching, local filtering and the composed grid view.
//!
//! The full plant list is fetched once and filtered in memory. This keeps
//! the filter instant but loads the entire catalog on every visit.

pub mod filter;
pub mod query;
pub mod view;

pub use filter::CatalogFilter;
pub use query::PlantQuery;
pub use view::{CatalogPage, CatalogView, PlantCardView};
