//! Compound-interest discounting of dated cash flows.
//!
//! The day-count convention is an explicit input: the same
//! [`Discounter`] must discount individual items and build the
//! present-value factors used by the schedule solver.

use chrono::NaiveDate;
use parcela_shared::types::{DayCountConvention, Money, round_money};
use rust_decimal::{Decimal, MathematicalOps};
use tracing::warn;

use crate::calendar::months_between;

/// Days elapsed from `start` to `due` under the given convention.
///
/// Commercial counts 30 days per whole month; actual counts calendar days.
#[must_use]
pub fn elapsed_days(start: NaiveDate, due: NaiveDate, convention: DayCountConvention) -> i64 {
    match convention {
        DayCountConvention::Commercial => months_between(start, due) * 30,
        DayCountConvention::Actual => (due - start).num_days(),
    }
}

/// Discount factor `1 / (1 + daily_rate)^elapsed_days`.
///
/// Returns one when there is nothing to discount (non-positive rate or days)
/// and zero when the growth term overflows.
#[must_use]
pub fn discount_factor(daily_rate: Decimal, elapsed_days: i64) -> Decimal {
    if elapsed_days <= 0 || daily_rate <= Decimal::ZERO {
        return Decimal::ONE;
    }
    match (Decimal::ONE + daily_rate).checked_powi(elapsed_days) {
        Some(growth) if !growth.is_zero() => Decimal::ONE / growth,
        _ => {
            warn!(%daily_rate, elapsed_days, "Discount growth overflowed");
            Decimal::ZERO
        }
    }
}

/// Present value of `nominal` due `elapsed_days` after the contract start.
///
/// No discount applies before the start or under a zero rate: the nominal
/// value comes back unchanged. Otherwise the result is rounded to cents.
#[must_use]
pub fn present_value(nominal: Money, daily_rate: Decimal, elapsed_days: i64) -> Money {
    if elapsed_days <= 0 || daily_rate <= Decimal::ZERO {
        return nominal;
    }
    round_money(nominal * discount_factor(daily_rate, elapsed_days))
}

/// Sum of discount factors over `due_dates`.
///
/// Under a non-positive rate every date weighs one. Otherwise dates on or
/// before `start` contribute nothing.
#[must_use]
pub fn present_value_factor(
    due_dates: &[NaiveDate],
    start: NaiveDate,
    daily_rate: Decimal,
    convention: DayCountConvention,
) -> Decimal {
    if daily_rate <= Decimal::ZERO {
        return Decimal::from(due_dates.len());
    }
    due_dates
        .iter()
        .map(|due| elapsed_days(start, *due, convention))
        .filter(|days| *days > 0)
        .map(|days| discount_factor(daily_rate, days))
        .sum()
}

/// Discounting context pinned for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discounter {
    /// Contract start date.
    pub start: NaiveDate,
    /// Daily compound rate as a fraction.
    pub daily_rate: Decimal,
    /// Day-count convention for the whole run.
    pub convention: DayCountConvention,
}

impl Discounter {
    /// Creates a discounter for one run.
    #[must_use]
    pub const fn new(start: NaiveDate, daily_rate: Decimal, convention: DayCountConvention) -> Self {
        Self {
            start,
            daily_rate,
            convention,
        }
    }

    /// Returns true when discounting is the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.daily_rate <= Decimal::ZERO
    }

    /// Elapsed days from the start to `due`.
    #[must_use]
    pub fn elapsed_days(&self, due: NaiveDate) -> i64 {
        elapsed_days(self.start, due, self.convention)
    }

    /// Present value of `nominal` due on `due`.
    #[must_use]
    pub fn present_value(&self, nominal: Money, due: NaiveDate) -> Money {
        present_value(nominal, self.daily_rate, self.elapsed_days(due))
    }

    /// Present-value factor of `due_dates`.
    #[must_use]
    pub fn factor(&self, due_dates: &[NaiveDate]) -> Decimal {
        present_value_factor(due_dates, self.start, self.daily_rate, self.convention)
    }
}
