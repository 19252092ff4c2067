//! Money rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every monetary figure is a `rust_decimal::Decimal` rounded to cents at
//! the point where it is computed, not only when it is displayed.

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amount in BRL. Always carries two decimal places once rounded.
pub type Money = Decimal;

/// Number of decimal places stored for every monetary figure.
pub const MONEY_SCALE: u32 = 2;

/// Half a cent. Balances below this are treated as settled.
pub const HALF_CENT: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Rounds an amount to cents (half-to-even) and pins the scale to two places
/// so that serialized values always read like `25000.00`.
#[must_use]
pub fn round_money(amount: Decimal) -> Money {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Truncates an amount to cents, rounding toward zero.
///
/// Used for uniform splits so that the remainder left for the last item is
/// never negative.
#[must_use]
pub fn truncate_money(amount: Decimal) -> Money {
    let mut truncated = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    truncated.rescale(MONEY_SCALE);
    truncated
}

/// Returns zero when the amount is below half a cent in magnitude.
#[must_use]
pub fn settle_dust(amount: Money) -> Money {
    if amount.abs() < HALF_CENT {
        round_money(Decimal::ZERO)
    } else {
        amount
    }
}

/// Sums already-rounded amounts and rounds the result.
pub fn sum_money<'a, I>(amounts: I) -> Money
where
    I: IntoIterator<Item = &'a Money>,
{
    round_money(amounts.into_iter().copied().sum())
}
