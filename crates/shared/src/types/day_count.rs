//! Day-count conventions used when discounting cash flows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How elapsed days between the contract start and a due date are counted.
///
/// A single run must use one convention for both individual discounting and
/// present-value factors, otherwise the linear solve drifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCountConvention {
    /// Fixed 30-day months: elapsed days = 30 x whole months between dates.
    #[default]
    Commercial,
    /// Actual calendar days between dates.
    Actual,
}

impl DayCountConvention {
    /// Number of days in a month used to derive the daily rate.
    #[must_use]
    pub fn days_per_month(self) -> Decimal {
        match self {
            Self::Commercial => Decimal::from(30),
            // 365.25 / 12
            Self::Actual => Decimal::new(304_375, 4),
        }
    }
}

impl std::fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commercial => write!(f, "commercial"),
            Self::Actual => write!(f, "actual"),
        }
    }
}

impl std::str::FromStr for DayCountConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "commercial" | "30" => Ok(Self::Commercial),
            "actual" => Ok(Self::Actual),
            _ => Err(format!("Unknown day-count convention: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_days_per_month() {
        assert_eq!(DayCountConvention::Commercial.days_per_month(), dec!(30));
        assert_eq!(DayCountConvention::Actual.days_per_month(), dec!(30.4375));
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(DayCountConvention::Commercial.to_string(), "commercial");
        assert_eq!(
            DayCountConvention::from_str("ACTUAL").unwrap(),
            DayCountConvention::Actual
        );
        assert!(DayCountConvention::from_str("365").is_err());
    }

    #[test]
    fn test_default_is_commercial() {
        assert_eq!(DayCountConvention::default(), DayCountConvention::Commercial);
    }
}
