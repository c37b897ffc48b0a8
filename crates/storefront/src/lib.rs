//! Greenhouse storefront client library.
//!
//! Client-side state for a plant shop backed by a REST API: the API client,
//! cart and wishlist stores, catalog filtering and the screens built on them.
//!
//! # Architecture
//!
//! - [`api`] - `reqwest` client for the plant backend
//! - [`stores`] - cart and wishlist caches synchronized with the backend
//! - [`catalog`] - plant list query, filter and grid view
//! - [`pages`] - cart and wishlist screens
//! - [`forms`] - add-plant form
//! - [`session`] - per-user bundle of all of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod identity;
pub mod notifications;
pub mod pages;
pub mod session;
pub mod stores;

pub use config::StorefrontConfig;
pub use error::AppError;
pub use session::Session;
