//! Cart screen.

use greenhouse_core::{CartContents, CartLineItem, CartSummary, PlantId};

use crate::stores::{CartStore, CheckoutUnavailable, MutationOutcome};

/// Shipping label; shipping is never charged.
pub const SHIPPING_LABEL: &str = "Free";

/// One cart line formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub plant_id: PlantId,
    pub name: String,
    pub scientific_name: Option<String>,
    pub categories: Vec<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            plant_id: item.plant_id.clone(),
            name: item.name.clone(),
            scientific_name: item.scientific_name.clone(),
            categories: item.categories.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_price: item.line_total().display(),
        }
    }
}

/// The whole cart formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: &'static str,
    pub tax: String,
    pub total: String,
}

impl CartView {
    /// Build the view from cached contents and their summary.
    #[must_use]
    pub fn new(contents: &CartContents, summary: &CartSummary) -> Self {
        Self {
            items: contents.items.iter().map(CartItemView::from).collect(),
            item_count: summary.item_count,
            subtotal: summary.subtotal.display(),
            shipping: SHIPPING_LABEL,
            tax: summary.tax.display(),
            total: summary.total.display(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart screen actions on top of the cart store.
#[derive(Debug, Clone)]
pub struct CartPage {
    cart: CartStore,
}

impl CartPage {
    #[must_use]
    pub const fn new(cart: CartStore) -> Self {
        Self { cart }
    }

    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::new(&self.cart.contents(), &self.cart.summary())
    }

    /// "+" button.
    pub async fn increment(&self, plant_id: &PlantId) -> MutationOutcome {
        let quantity = self.current_quantity(plant_id);
        self.cart.set_quantity(plant_id, quantity + 1).await
    }

    /// "-" button. Disabled at quantity 1; use `remove` instead.
    pub async fn decrement(&self, plant_id: &PlantId) -> MutationOutcome {
        let quantity = self.current_quantity(plant_id);
        if quantity <= 1 {
            return MutationOutcome::failed("Quantity is already at the minimum");
        }
        self.cart.set_quantity(plant_id, quantity - 1).await
    }

    pub async fn remove(&self, plant_id: &PlantId) -> MutationOutcome {
        self.cart.remove(plant_id).await
    }

    pub async fn clear(&self) -> MutationOutcome {
        self.cart.clear().await
    }

    /// # Errors
    ///
    /// Always returns `CheckoutUnavailable`.
    pub fn checkout(&self) -> Result<(), CheckoutUnavailable> {
        self.cart.checkout()
    }

    fn current_quantity(&self, plant_id: &PlantId) -> i64 {
        self.cart
            .contents()
            .line(plant_id)
            .map_or(0, |line| i64::from(line.quantity))
    }
}

#[cfg(test)]
mod tests {
    use greenhouse_core::{Price, TaxRate};

    use super::*;

    #[test]
    fn test_view_formats_summary() {
        let contents = CartContents::from_items(vec![CartLineItem {
            plant_id: PlantId::new("p1"),
            name: "Snake Plant".to_string(),
            scientific_name: None,
            price: Price::from(100),
            quantity: 2,
            categories: vec!["Indoor".to_string()],
        }]);
        let view = CartView::new(&contents, &contents.summary(TaxRate::default()));

        assert_eq!(view.item_count, 2);
        assert_eq!(view.items[0].price, "₹100.00");
        assert_eq!(view.items[0].line_price, "₹200.00");
        assert_eq!(view.subtotal, "₹200.00");
        assert_eq!(view.tax, "₹20.00");
        assert_eq!(view.total, "₹220.00");
        assert_eq!(view.shipping, "Free");
    }

    #[test]
    fn test_empty_view() {
        let contents = CartContents::default();
        let view = CartView::new(&contents, &contents.summary(TaxRate::default()));
        assert!(view.is_empty());
        assert_eq!(view.total, "₹0.00");
    }
}
