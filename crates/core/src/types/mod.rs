//! Core types for Greenhouse.
//!
//! This module provides type-safe wrappers for the storefront domain.

pub mod cart;
pub mod id;
pub mod plant;
pub mod price;
pub mod wishlist;

pub use cart::{CartContents, CartLineItem, CartSummary};
pub use id::*;
pub use plant::{CareLevel, LightRequirement, NewPlant, Pagination, Plant};
pub use price::{AmountError, CURRENCY_SYMBOL, Price, TaxRate};
pub use wishlist::{AddToWishlist, WishlistContents, WishlistEntry};
