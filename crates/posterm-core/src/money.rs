//! Currency arithmetic helpers.
//!
//! All amounts are [`Decimal`] in the currency's standard unit (dollars, not
//! cents). Rounding to cents happens exactly once, on the tax-inclusive total.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places shown and charged.
pub const CURRENCY_DP: u32 = 2;

/// Rounds `amount` to cents, half-up (`0.005` → `0.01`).
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats `amount` with the currency symbol and exactly two decimals,
/// e.g. `format_amount("$", 4.6)` → `"$4.60"`.
#[must_use]
pub fn format_amount(symbol: &str, amount: Decimal) -> String {
    format!("{symbol}{:.2}", round_currency(amount))
}

/// Subtotal / tax / total split shown on the widescreen cart panel.
///
/// `tax` is derived as `total - subtotal` so the three lines always add up
/// on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl TaxBreakdown {
    /// Computes the breakdown for a pre-tax `subtotal` at `tax_rate`
    /// (`0.15` for 15%).
    #[must_use]
    pub fn compute(subtotal: Decimal, tax_rate: Decimal) -> Self {
        let total = round_currency(subtotal * (Decimal::ONE + tax_rate));
        Self {
            subtotal,
            tax: total - subtotal,
            total,
        }
    }
}
