//! Cart and wishlist screens.

pub mod cart;
pub mod wishlist;

pub use cart::{CartItemView, CartPage, CartView};
pub use wishlist::WishlistPage;
