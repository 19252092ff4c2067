//! Price-Begin error types.

use parcela_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from building an annuity-due amortization table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceBeginError {
    /// Financed principal must be positive.
    #[error("Financed principal must be greater than zero, got {0}")]
    NonPositivePrincipal(Decimal),

    /// Installment count above the configured ceiling.
    #[error("Installment count {count} exceeds the maximum of {max}")]
    TooManyInstallments {
        /// Requested count.
        count: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The rate is too large to compound over the term.
    #[error("Monthly rate {rate}% cannot be compounded over {count} installments")]
    RateOutOfRange {
        /// Monthly rate in percent.
        rate: Decimal,
        /// Requested count.
        count: u32,
    },
}

impl From<PriceBeginError> for AppError {
    fn from(e: PriceBeginError) -> Self {
        Self::Validation(e.to_string())
    }
}
