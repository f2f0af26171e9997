use std::sync::Arc;

use rust_decimal::Decimal;

use crate::cart::Cart;
use crate::catalog::{Catalog, CategoryFilter, Product};
use crate::error::OrderError;
use crate::money::TaxBreakdown;
use crate::payment::{PaymentMethod, PaymentState, TransactionRecord};

/// What the cart panel shows: unit count, distinct lines and the
/// tax-inclusive total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub item_count: u32,
    pub line_count: usize,
    pub total: Decimal,
}

/// The cashier's working state for one terminal.
///
/// Owns the cart and the payment state outright; holds the catalog behind an
/// [`Arc`] so a sync can swap it without copying.
#[derive(Debug, Clone)]
pub struct OrderSession {
    catalog: Arc<Catalog>,
    cart: Cart,
    active_category: CategoryFilter,
    payment: PaymentState,
    tax_rate: Decimal,
}

impl OrderSession {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, tax_rate: Decimal) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            active_category: CategoryFilter::All,
            payment: PaymentState::Idle,
            tax_rate,
        }
    }

    /// Points the session at a freshly synced catalog. The cart keeps its
    /// snapshotted lines even if their products disappeared.
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
    }

    /// Sets the category filter. `None` or `"all"` shows every product.
    pub fn select_category(&mut self, category_id: Option<&str>) {
        self.active_category = CategoryFilter::from_id(category_id);
    }

    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.catalog.filter_products(&self.active_category)
    }

    /// Adds one unit of `product_id`. Returns `false` (and changes nothing)
    /// when the product is not in the catalog or a payment is on screen.
    pub fn add_to_cart(&mut self, product_id: &str) -> bool {
        if !self.payment.is_idle() {
            tracing::debug!(product_id, state = self.payment.name(), "add ignored during payment");
            return false;
        }
        let Some(product) = self.catalog.product(product_id) else {
            tracing::debug!(product_id, "add ignored: product not in catalog");
            return false;
        };
        self.cart.add_or_increment(product);
        true
    }

    /// Removes one unit of `product_id`. Returns `false` when nothing changed.
    pub fn remove_one_from_cart(&mut self, product_id: &str) -> bool {
        if !self.payment.is_idle() {
            tracing::debug!(product_id, state = self.payment.name(), "remove ignored during payment");
            return false;
        }
        self.cart.decrement_or_remove(product_id)
    }

    /// `subtotal * (1 + tax_rate)`, rounded half-up to cents once.
    #[must_use]
    pub fn total_due(&self) -> Decimal {
        self.tax_breakdown().total
    }

    #[must_use]
    pub fn tax_breakdown(&self) -> TaxBreakdown {
        TaxBreakdown::compute(self.cart.subtotal(), self.tax_rate)
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.cart.item_count(),
            line_count: self.cart.lines().len(),
            total: self.total_due(),
        }
    }

    /// Locks in the current total and opens the payment prompt.
    ///
    /// # Errors
    ///
    /// - [`OrderError::PaymentInProgress`] if a checkout is already on screen.
    /// - [`OrderError::EmptyCart`] if there is nothing to pay for.
    pub fn checkout(&mut self) -> Result<Decimal, OrderError> {
        if !self.payment.is_idle() {
            return Err(OrderError::PaymentInProgress);
        }
        if self.cart.item_count() == 0 {
            return Err(OrderError::EmptyCart);
        }
        let amount = self.total_due();
        self.payment.begin(amount)?;
        tracing::info!(%amount, items = self.cart.item_count(), "checkout started");
        Ok(amount)
    }

    /// Marks the pending payment approved.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless awaiting payment.
    pub fn confirm_payment(&mut self) -> Result<Decimal, OrderError> {
        let amount = self.payment.approve()?;
        tracing::info!(%amount, "payment approved");
        Ok(amount)
    }

    /// Abandons the pending payment. The cart is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless awaiting payment.
    pub fn cancel_payment(&mut self) -> Result<(), OrderError> {
        self.payment.cancel()?;
        tracing::info!("payment cancelled");
        Ok(())
    }

    /// Dismisses the approved or cancelled overlay and returns to idle.
    ///
    /// After an approval the cart is cleared and the returned record should
    /// be handed to the sync gateway. After a cancellation nothing is
    /// returned and the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] from `Idle` or
    /// `AwaitingPayment`.
    pub fn finish_payment(&mut self) -> Result<Option<TransactionRecord>, OrderError> {
        let Some(total) = self.payment.finish()? else {
            return Ok(None);
        };
        let items = self.cart.lines().to_vec();
        self.cart = Cart::new();
        let record = TransactionRecord::new(items, total, PaymentMethod::Card);
        tracing::info!(reference = %record.reference, %total, "sale completed; cart cleared");
        Ok(Some(record))
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn active_category(&self) -> &CategoryFilter {
        &self.active_category
    }

    #[must_use]
    pub fn payment_state(&self) -> PaymentState {
        self.payment
    }

    #[must_use]
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
