//! Greenhouse Core - Shared types library.
//!
//! This crate provides the domain types used across all Greenhouse components:
//! - `storefront` - API client, cart/wishlist stores and catalog view models
//! - `cli` - Command-line front end for browsing and shopping
//! - `integration-tests` - Fake backend and end-to-end store tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere,
//! including the fake backend used by the integration tests.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, plants, cart line items, wishlist entries and
//!   price arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
