//! Selection of the effective monthly rate for a run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rule deciding which monthly rate (in percent) a run actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatePolicy {
    /// Use the requested rate as-is.
    Fixed,
    /// Monthly-only plans with 1..=`max_installments` installments are interest-free.
    PromotionalWindow {
        /// Largest installment count that still qualifies.
        max_installments: u32,
    },
    /// Price-Begin product tiers: up to 36 installments 0%, up to 48 0.395%, beyond 0.79%.
    Tiered,
}

impl RatePolicy {
    /// Returns the monthly rate, in percent, to apply.
    ///
    /// `monthly_only` tells whether the plan consists solely of monthly
    /// installments; only such plans qualify for the promotional window.
    #[must_use]
    pub fn effective_percent(self, requested: Decimal, count: u32, monthly_only: bool) -> Decimal {
        match self {
            Self::Fixed => requested,
            Self::PromotionalWindow { max_installments } => {
                if monthly_only && (1..=max_installments).contains(&count) {
                    Decimal::ZERO
                } else {
                    requested
                }
            }
            Self::Tiered => tiered_percent(count),
        }
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::PromotionalWindow {
            max_installments: 36,
        }
    }
}

fn tiered_percent(count: u32) -> Decimal {
    match count {
        0..=36 => Decimal::ZERO,
        37..=48 => Decimal::new(395, 3),
        _ => Decimal::new(79, 2),
    }
}
