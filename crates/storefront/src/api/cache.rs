//! Cache types for backend responses.

use std::sync::Arc;

/// Cache key for session-lived responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<String>>),
}
