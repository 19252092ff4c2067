//! Property-based tests for anchored due-date arithmetic.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use super::due_date::{PeriodKind, adjust_due_date, days_in_month, months_between};

fn base_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2100, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        let day = d.min(days_in_month(y, m));
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    })
}

fn period() -> impl Strategy<Value = PeriodKind> {
    prop_oneof![
        Just(PeriodKind::Monthly),
        Just(PeriodKind::Semiannual),
        Just(PeriodKind::Annual)
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The due date lands exactly `count x period` months after the base.
    #[test]
    fn prop_month_offset_is_exact(
        base in base_date(),
        period in period(),
        count in 1u32..400,
        anchor in 1u32..=31,
    ) {
        let due = adjust_due_date(base, period, count, anchor);
        prop_assert_eq!(months_between(base, due), i64::from(count * period.months()));
    }

    /// The day of month is the anchor, clipped to the month's last day.
    #[test]
    fn prop_day_is_clipped_anchor(
        base in base_date(),
        period in period(),
        count in 1u32..400,
        anchor in 1u32..=31,
    ) {
        let due = adjust_due_date(base, period, count, anchor);
        let expected_day = anchor.min(days_in_month(due.year(), due.month()));
        prop_assert_eq!(due.day(), expected_day);
    }

    /// Successive counts never go backwards in time.
    #[test]
    fn prop_monotonic_in_count(
        base in base_date(),
        period in period(),
        count in 1u32..200,
    ) {
        let anchor = base.day();
        let earlier = adjust_due_date(base, period, count, anchor);
        let later = adjust_due_date(base, period, count + 1, anchor);
        prop_assert!(later > earlier);
    }
}
