use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// One product entry in the cart with its aggregated quantity.
///
/// `name` and `unit_price` are copied from the product when the line is
/// created and never refreshed, so a catalog price change does not reprice
/// an open order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id")]
    pub product_id: String,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl LineItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The in-progress order, in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps the existing line for `product` by one, or appends a new line
    /// with quantity 1 at the end.
    pub fn add_or_increment(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.lines.push(LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        });
    }

    /// Takes one unit of `product_id` off the order, dropping the line when it
    /// reaches zero. Returns `false` when the product was not in the cart.
    pub fn decrement_or_remove(&mut self, product_id: &str) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return false;
        };

        if self.lines[index].quantity > 1 {
            self.lines[index].quantity -= 1;
        } else {
            // `remove` shifts later lines left, keeping their order.
            self.lines.remove(index);
        }
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Pre-tax sum of every line. Exact; no rounding.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Total units across all lines (the "N items" label), not the number of
    /// distinct lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Quantity of `product_id` in the cart, `0` when absent. Drives the
    /// badge on product buttons.
    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
