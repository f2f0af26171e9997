//! Payment overlay state machine.
//!
//! ```text
//! Idle ──checkout──▶ AwaitingPayment(amount) ──confirm──▶ Approved(amount) ──finish──▶ Idle
//!                          │                                                  (cart cleared)
//!                          └──cancel──▶ Cancelled ──finish──▶ Idle (cart kept)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::LineItem;
use crate::error::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Idle,
    AwaitingPayment { amount: Decimal },
    Approved { amount: Decimal },
    Cancelled,
}

impl PaymentState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingPayment { .. } => "awaiting payment",
            Self::Approved { .. } => "approved",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// `Idle → AwaitingPayment`. Any non-idle state means a checkout attempt
    /// is still on screen.
    pub(crate) fn begin(&mut self, amount: Decimal) -> Result<(), OrderError> {
        if !self.is_idle() {
            return Err(OrderError::PaymentInProgress);
        }
        *self = Self::AwaitingPayment { amount };
        Ok(())
    }

    /// `AwaitingPayment → Approved`, returning the approved amount.
    pub(crate) fn approve(&mut self) -> Result<Decimal, OrderError> {
        match *self {
            Self::AwaitingPayment { amount } => {
                *self = Self::Approved { amount };
                Ok(amount)
            }
            other => Err(OrderError::InvalidTransition {
                from: other.name(),
                action: "confirm payment",
            }),
        }
    }

    /// `AwaitingPayment → Cancelled`.
    pub(crate) fn cancel(&mut self) -> Result<(), OrderError> {
        match *self {
            Self::AwaitingPayment { .. } => {
                *self = Self::Cancelled;
                Ok(())
            }
            other => Err(OrderError::InvalidTransition {
                from: other.name(),
                action: "cancel payment",
            }),
        }
    }

    /// `Approved → Idle` or `Cancelled → Idle`. Returns the approved amount
    /// when leaving `Approved`, `None` when leaving `Cancelled`.
    pub(crate) fn finish(&mut self) -> Result<Option<Decimal>, OrderError> {
        match *self {
            Self::Approved { amount } => {
                *self = Self::Idle;
                Ok(Some(amount))
            }
            Self::Cancelled => {
                *self = Self::Idle;
                Ok(None)
            }
            other => Err(OrderError::InvalidTransition {
                from: other.name(),
                action: "finish payment",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

/// Completed sale, posted to the backend after approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub reference: Uuid,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub completed_at: DateTime<Utc>,
}

impl TransactionRecord {
    #[must_use]
    pub fn new(items: Vec<LineItem>, total: Decimal, payment_method: PaymentMethod) -> Self {
        Self {
            reference: Uuid::new_v4(),
            items,
            total,
            payment_method,
            completed_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount() -> Decimal {
        Decimal::new(460, 2)
    }

    #[test]
    fn happy_path_returns_to_idle() {
        let mut state = PaymentState::Idle;
        state.begin(amount()).expect("begin");
        assert_eq!(state, PaymentState::AwaitingPayment { amount: amount() });
        assert_eq!(state.approve().expect("approve"), amount());
        assert_eq!(state, PaymentState::Approved { amount: amount() });
        assert_eq!(state.finish().expect("finish"), Some(amount()));
        assert!(state.is_idle());
    }

    #[test]
    fn cancel_path_returns_to_idle_without_amount() {
        let mut state = PaymentState::Idle;
        state.begin(amount()).expect("begin");
        state.cancel().expect("cancel");
        assert_eq!(state, PaymentState::Cancelled);
        assert_eq!(state.finish().expect("finish"), None);
        assert!(state.is_idle());
    }

    #[test]
    fn begin_twice_is_payment_in_progress() {
        let mut state = PaymentState::Idle;
        state.begin(amount()).expect("begin");
        assert_eq!(state.begin(amount()), Err(OrderError::PaymentInProgress));
        assert_eq!(state, PaymentState::AwaitingPayment { amount: amount() });
    }

    #[test]
    fn idle_rejects_everything_but_begin() {
        let mut state = PaymentState::Idle;
        assert!(matches!(
            state.approve(),
            Err(OrderError::InvalidTransition { from: "idle", .. })
        ));
        assert!(matches!(
            state.cancel(),
            Err(OrderError::InvalidTransition { from: "idle", .. })
        ));
        assert!(matches!(
            state.finish(),
            Err(OrderError::InvalidTransition { from: "idle", .. })
        ));
        assert!(state.is_idle());
    }

    #[test]
    fn approved_cannot_be_cancelled() {
        let mut state = PaymentState::Approved { amount: amount() };
        assert!(state.cancel().is_err());
        assert_eq!(state, PaymentState::Approved { amount: amount() });
    }

    #[test]
    fn awaiting_cannot_finish() {
        let mut state = PaymentState::AwaitingPayment { amount: amount() };
        assert!(state.finish().is_err());
    }

    #[test]
    fn transaction_record_serializes_for_backend() {
        let record = TransactionRecord::new(
            vec![LineItem {
                product_id: "p2".to_string(),
                name: "Cappuccino".to_string(),
                unit_price: Decimal::new(400, 2),
                quantity: 1,
            }],
            amount(),
            PaymentMethod::Card,
        );
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["payment_method"], "card");
        assert_eq!(json["total"], "4.60");
        assert_eq!(json["items"][0]["id"], "p2");
        assert_eq!(record.item_count(), 1);
    }
}
