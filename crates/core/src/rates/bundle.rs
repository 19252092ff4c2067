//! Compound conversion of a monthly nominal rate into its equivalents.

use std::str::FromStr;

use parcela_shared::types::DayCountConvention;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Equivalent compound rates, all expressed as fractions (0.0089 = 0.89%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBundle {
    /// Monthly rate.
    pub monthly: Decimal,
    /// Annual equivalent: (1 + monthly)^12 - 1.
    pub annual: Decimal,
    /// Semiannual equivalent: (1 + monthly)^6 - 1.
    pub semiannual: Decimal,
    /// Daily equivalent: (1 + monthly)^(1/D) - 1.
    pub daily: Decimal,
}

impl RateBundle {
    /// The degenerate bundle. Discounting under it is the identity.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            monthly: Decimal::ZERO,
            annual: Decimal::ZERO,
            semiannual: Decimal::ZERO,
            daily: Decimal::ZERO,
        }
    }

    /// Builds the bundle from a monthly rate given as a percentage (0.89 for 0.89%).
    ///
    /// Negative rates and arithmetic overflow yield the zero bundle.
    #[must_use]
    pub fn from_monthly_percent(percent: Decimal, convention: DayCountConvention) -> Self {
        if percent.is_zero() {
            return Self::zero();
        }
        if percent.is_sign_negative() {
            warn!(%percent, "Negative monthly rate, using zero rate bundle");
            return Self::zero();
        }

        let monthly = percent / Decimal::ONE_HUNDRED;
        let growth = Decimal::ONE + monthly;
        let daily_exponent = Decimal::ONE / convention.days_per_month();

        let converted = growth.checked_powi(12).and_then(|annual| {
            let semiannual = growth.checked_powi(6)?;
            let daily = growth.checked_powd(daily_exponent)?;
            Some((annual, semiannual, daily))
        });

        match converted {
            Some((annual, semiannual, daily)) => Self {
                monthly,
                annual: annual - Decimal::ONE,
                semiannual: semiannual - Decimal::ONE,
                daily: daily - Decimal::ONE,
            },
            None => {
                warn!(%percent, "Rate conversion overflowed, using zero rate bundle");
                Self::zero()
            }
        }
    }

    /// Builds the bundle from raw user text such as `"0,89"` or `"0.89%"`.
    ///
    /// Malformed text never fails: it yields the zero bundle so that scheduling
    /// always has a usable rate.
    #[must_use]
    pub fn from_percent_str(raw: &str, convention: DayCountConvention) -> Self {
        if let Some(percent) = parse_percentage(raw) {
            Self::from_monthly_percent(percent, convention)
        } else {
            warn!(input = raw, "Malformed rate input, using zero rate bundle");
            Self::zero()
        }
    }

    /// Returns true when discounting degenerates to the identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.daily <= Decimal::ZERO
    }
}

impl Default for RateBundle {
    fn default() -> Self {
        Self::zero()
    }
}

/// Parses a percentage typed in either Brazilian or international notation.
///
/// Accepts `"0,89"`, `"0.89"`, `" 0.89 % "`. Returns `None` for anything else.
#[must_use]
pub fn parse_percentage(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
