//! Cart types and order-summary arithmetic.

use serde::{Deserialize, Serialize};

use super::id::PlantId;
use super::price::{Price, TaxRate};

/// One line of a cart: a plant reference, a quantity and the plant fields
/// needed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Plant this line refers to.
    #[serde(rename = "_id", alias = "plantId")]
    pub plant_id: PlantId,
    /// Plant name at the time of the fetch.
    pub name: String,
    /// Botanical name, if the backend sent one.
    #[serde(
        rename = "scientificName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scientific_name: Option<String>,
    /// Unit price.
    pub price: Price,
    /// Always at least 1 on a well-formed line.
    pub quantity: u32,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CartLineItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Payload of `GET /cart/:userId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartContents {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    /// Item count as reported by the backend.
    #[serde(rename = "totalItems", default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u32>,
}

impl CartContents {
    /// Build contents from line items, deriving the item count.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let total_items = Some(quantity_sum(&items));
        Self { items, total_items }
    }

    /// Drop lines whose quantity is zero; such lines count as removed.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.items.retain(|item| item.quantity > 0);
        self
    }

    /// Badge count: the backend's `totalItems` when present, otherwise the
    /// sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.total_items
            .unwrap_or_else(|| quantity_sum(&self.items))
    }

    /// Whether a line for `plant_id` exists.
    #[must_use]
    pub fn contains(&self, plant_id: &PlantId) -> bool {
        self.items.iter().any(|item| &item.plant_id == plant_id)
    }

    /// Look up the line for `plant_id`.
    #[must_use]
    pub fn line(&self, plant_id: &PlantId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.plant_id == plant_id)
    }

    /// Σ price × quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Order summary using `tax_rate` on top of the subtotal.
    #[must_use]
    pub fn summary(&self, tax_rate: TaxRate) -> CartSummary {
        let subtotal = self.subtotal();
        let tax = tax_rate.apply(subtotal);
        CartSummary {
            item_count: self.item_count(),
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

/// Σ quantity, saturating at `u32::MAX`.
fn quantity_sum(items: &[CartLineItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
}

/// Order summary numbers shown next to the cart. Shipping is always free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: u32, quantity: u32) -> CartLineItem {
        CartLineItem {
            plant_id: PlantId::new(id),
            name: format!("Plant {id}"),
            scientific_name: None,
            price: Price::from(price),
            quantity,
            categories: vec!["Indoor".to_string()],
        }
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let cart = CartContents::from_items(vec![line("p1", 100, 2), line("p2", 45, 3)]);
        assert_eq!(cart.subtotal(), Price::from(335));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_empty_cart_summary_is_zero() {
        let summary = CartContents::default().summary(TaxRate::default());
        assert_eq!(summary, CartSummary::default());
    }

    #[test]
    fn test_summary_applies_tax() {
        let cart = CartContents::from_items(vec![line("p1", 100, 2)]);
        let summary = cart.summary(TaxRate::default());
        assert_eq!(summary.subtotal, Price::from(200));
        assert_eq!(summary.tax, Price::from(20));
        assert_eq!(summary.total, Price::from(220));
    }

    #[test]
    fn test_item_count_prefers_backend_total() {
        let mut cart = CartContents::from_items(vec![line("p1", 10, 2)]);
        cart.total_items = Some(7);
        assert_eq!(cart.item_count(), 7);
        cart.total_items = None;
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_huge_quantities_saturate_count() {
        let mut cart =
            CartContents::from_items(vec![line("p1", 1, 4_000_000_000), line("p2", 1, 4_000_000_000)]);
        assert_eq!(cart.item_count(), u32::MAX);
        cart.total_items = None;
        assert_eq!(cart.item_count(), u32::MAX);
        assert_eq!(cart.summary(TaxRate::default()).item_count, u32::MAX);
    }

    #[test]
    fn test_huge_prices_saturate_subtotal() {
        let mut big = line("p1", 1, 2);
        big.price = Price::parse("50000000000000000000000000000").unwrap();
        let cart = CartContents::from_items(vec![big, line("p2", 10, 1)]);
        let summary = cart.summary(TaxRate::default());
        assert_eq!(summary.subtotal.amount(), rust_decimal::Decimal::MAX);
        assert_eq!(summary.total.amount(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_negative_line_price_is_rejected() {
        let decoded = serde_json::from_value::<CartLineItem>(serde_json::json!({
            "_id": "p1", "name": "Fern", "price": -50, "quantity": 1
        }));
        assert!(decoded.is_err());
    }

    #[test]
    fn test_normalized_drops_zero_quantity_lines() {
        let cart = CartContents {
            items: vec![line("p1", 10, 0), line("p2", 10, 1)],
            total_items: None,
        }
        .normalized();
        assert!(!cart.contains(&PlantId::new("p1")));
        assert!(cart.contains(&PlantId::new("p2")));
    }

    #[test]
    fn test_decodes_backend_payload() {
        let cart: CartContents = serde_json::from_value(serde_json::json!({
            "items": [
                {"_id": "p1", "name": "Snake Plant", "price": 199, "quantity": 2,
                 "categories": ["Indoor"]}
            ],
            "totalItems": 2
        }))
        .unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line(&PlantId::new("p1")).unwrap().quantity, 2);
        assert_eq!(cart.subtotal(), Price::from(398));
    }
}
