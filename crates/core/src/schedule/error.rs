//! Schedule error types.

use parcela_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input validation failures of a schedule run.
///
/// None of these are fatal: the run is aborted and the caller corrects inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Total price must be positive.
    #[error("Total price must be greater than zero")]
    NonPositivePrice,

    /// Down payment cannot be negative.
    #[error("Down payment cannot be negative")]
    NegativeDownPayment,

    /// Down payment must be below the total price.
    #[error("Down payment {down_payment} must be lower than total price {price}")]
    DownPaymentNotBelowPrice {
        /// Total price.
        price: Decimal,
        /// Down payment.
        down_payment: Decimal,
    },

    /// Financed principal must be positive.
    #[error("Financed principal must be greater than zero, got {0}")]
    NonPositivePrincipal(Decimal),

    /// A supplied value is negative.
    #[error("{field} cannot be negative, got {value}")]
    NegativeValue {
        /// Offending field.
        field: String,
        /// Supplied value.
        value: Decimal,
    },

    /// More payments than the configured ceiling.
    #[error("Payment count {count} exceeds the maximum of {max}")]
    TooManyPayments {
        /// Requested count.
        count: u32,
        /// Configured ceiling.
        max: u32,
    },

    /// Custom balloon month outside the installment range.
    #[error("Balloon month {month} is outside installments 1..={installments}")]
    InvalidBalloonMonth {
        /// Supplied month.
        month: u32,
        /// Number of installments.
        installments: u32,
    },

    /// First balloon month outside the installment range.
    #[error("First balloon month {month} is outside installments 1..={installments}")]
    InvalidFirstBalloonMonth {
        /// Supplied month.
        month: u32,
        /// Number of installments.
        installments: u32,
    },

    /// Special balloons alone are worth more than the financed principal.
    #[error("Present value of special balloons ({overrides_pv}) exceeds financed principal ({principal})")]
    OverridesExceedPrincipal {
        /// Present value of all special balloons.
        overrides_pv: Decimal,
        /// Financed principal.
        principal: Decimal,
    },

    /// A supplied value leaves nothing (or less than nothing) for the other group.
    #[error("Present value of the supplied {field} ({present_value}) exceeds the remaining principal ({available})")]
    KnownValueExceedsPrincipal {
        /// Which supplied value.
        field: String,
        /// Present value of the supplied group.
        present_value: Decimal,
        /// Principal left after special balloons.
        available: Decimal,
    },

    /// Both installments and balloons are unknown.
    #[error("Both installment and balloon values are unknown: supply one of them")]
    Underdetermined,
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::OverridesExceedPrincipal { .. }
            | ScheduleError::KnownValueExceedsPrincipal { .. }
            | ScheduleError::Underdetermined => Self::BusinessRule(e.to_string()),
            _ => Self::Validation(e.to_string()),
        }
    }
}
