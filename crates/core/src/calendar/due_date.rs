//! Due-date arithmetic anchored to a fixed day of the month.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Length of one scheduling period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// One calendar month.
    Monthly,
    /// Six calendar months.
    Semiannual,
    /// Twelve calendar months.
    Annual,
}

impl PeriodKind {
    /// Number of calendar months in one period.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Semiannual => 6,
            Self::Annual => 12,
        }
    }
}

/// Advances `base` by `count` periods and pins the result to `anchor_day`.
///
/// When the anchor day does not exist in the target month (31 in February,
/// say) the date is clipped to that month's last day. `count == 0` returns
/// `base` unchanged.
///
/// If the target date cannot be represented, falls back to a flat
/// `count x 30` calendar-day offset from `base`.
#[must_use]
pub fn adjust_due_date(base: NaiveDate, period: PeriodKind, count: u32, anchor_day: u32) -> NaiveDate {
    let Some(months_to_add) = count.checked_mul(period.months()) else {
        return flat_offset(base, count);
    };
    if months_to_add == 0 {
        return base;
    }

    match anchored_date(base, months_to_add, anchor_day) {
        Some(date) => date,
        None => flat_offset(base, count),
    }
}

fn anchored_date(base: NaiveDate, months_to_add: u32, anchor_day: u32) -> Option<NaiveDate> {
    let total_months = base.month0().checked_add(months_to_add)?;
    let year = base.year().checked_add(i32::try_from(total_months / 12).ok()?)?;
    let month = total_months % 12 + 1;
    let day = anchor_day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

fn flat_offset(base: NaiveDate, count: u32) -> NaiveDate {
    warn!(%base, count, "Due date out of range, falling back to 30-day periods");
    base.checked_add_days(Days::new(u64::from(count) * 30))
        .unwrap_or(base)
}

/// Whole calendar months from `start` to `end`, ignoring the day of month.
#[must_use]
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    i64::from(end.year() - start.year()) * 12 + i64::from(end.month()) - i64::from(start.month())
}

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
