//! Price-Begin amortization types.

use chrono::NaiveDate;
use parcela_shared::types::Money;
use parcela_shared::types::date::dmy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs of an annuity-due amortization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBeginTerms {
    /// Financed principal.
    pub principal: Money,
    /// Monthly rate in percent.
    pub monthly_rate: Decimal,
    /// Contract date; the first payment falls on it.
    pub start_date: NaiveDate,
    /// Number of payments.
    pub installment_count: u32,
}

/// One row of the amortization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number (1-based).
    pub number: u32,
    /// Display label, e.g. "Parcela 1".
    pub label: String,
    /// Due date.
    #[serde(with = "dmy")]
    pub due_date: NaiveDate,
    /// Amount paid.
    pub payment: Money,
    /// Interest portion.
    pub interest: Money,
    /// Principal portion.
    pub amortization: Money,
    /// Balance left after this payment.
    pub balance: Money,
}

/// A full Price-Begin table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBeginSchedule {
    /// Financed principal.
    pub principal: Money,
    /// Monthly rate in percent.
    pub monthly_rate: Decimal,
    /// Fixed payment before the terminal correction.
    pub fixed_payment: Money,
    /// Rows in payment order.
    pub rows: Vec<AmortizationRow>,
    /// Sum of all payments.
    pub total_paid: Money,
    /// Sum of all interest.
    pub total_interest: Money,
}
