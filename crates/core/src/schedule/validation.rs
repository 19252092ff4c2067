//! Input validation for schedule runs.

use parcela_shared::types::{Money, round_money};
use rust_decimal::Decimal;

use super::error::ScheduleError;
use super::types::{KnownValue, KnownValues, LoanTerms, SpecialOverrides};

/// Financed principal: total price minus down payment, rounded to cents.
///
/// # Errors
///
/// Returns an error when the price is not positive, the down payment is
/// negative, or the down payment reaches the price.
pub fn financed_principal(total_price: Money, down_payment: Money) -> Result<Money, ScheduleError> {
    if total_price <= Decimal::ZERO {
        return Err(ScheduleError::NonPositivePrice);
    }
    if down_payment < Decimal::ZERO {
        return Err(ScheduleError::NegativeDownPayment);
    }
    if down_payment >= total_price {
        return Err(ScheduleError::DownPaymentNotBelowPrice {
            price: total_price,
            down_payment,
        });
    }
    Ok(round_money(total_price - down_payment))
}

/// Validates terms, supplied values and overrides before solving.
///
/// # Errors
///
/// Returns an error for a non-positive principal, a payment count above
/// `max_payments`, or any negative value.
pub fn validate_inputs(
    terms: &LoanTerms,
    known: KnownValues,
    overrides: &SpecialOverrides,
    max_payments: u32,
) -> Result<(), ScheduleError> {
    if terms.principal <= Decimal::ZERO {
        return Err(ScheduleError::NonPositivePrincipal(terms.principal));
    }
    if terms.payment_count > max_payments {
        return Err(ScheduleError::TooManyPayments {
            count: terms.payment_count,
            max: max_payments,
        });
    }

    for (field, value) in [("installment value", known.installment), ("balloon value", known.balloon)] {
        if let KnownValue::Known(v) = value
            && v < Decimal::ZERO
        {
            return Err(ScheduleError::NegativeValue {
                field: field.to_string(),
                value: v,
            });
        }
    }

    if let Some((ordinal, value)) = overrides.iter().find(|(_, v)| **v < Decimal::ZERO) {
        return Err(ScheduleError::NegativeValue {
            field: format!("special balloon {ordinal}"),
            value: *value,
        });
    }

    Ok(())
}
