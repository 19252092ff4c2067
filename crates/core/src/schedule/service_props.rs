//! Property-based tests for the schedule solver.

use chrono::NaiveDate;
use parcela_shared::types::DayCountConvention;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::compute_schedule;
use super::types::{
    BalloonPeriod, BalloonScheduling, KnownValue, KnownValues, LoanTerms, Modality, SpecialOverrides,
};

fn principal() -> impl Strategy<Value = Decimal> {
    (100i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn start_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2050, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..300).prop_map(|bp| Decimal::new(bp, 2))
}

fn convention() -> impl Strategy<Value = DayCountConvention> {
    prop_oneof![Just(DayCountConvention::Commercial), Just(DayCountConvention::Actual)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Under a zero rate the nominal values add up to the principal exactly
    /// and none of them is negative.
    #[test]
    fn prop_zero_rate_sum_is_exact(
        principal in principal(),
        start in start_date(),
        n in 1u32..=240,
    ) {
        let terms = LoanTerms {
            principal,
            monthly_rate: Decimal::ZERO,
            start_date: start,
            payment_count: n,
            modality: Modality::Monthly,
            day_count: DayCountConvention::Commercial,
        };
        let schedule = compute_schedule(&terms, KnownValues::unknown(), &SpecialOverrides::new()).unwrap();
        prop_assert_eq!(schedule.total.nominal, principal);
        prop_assert_eq!(schedule.total.present_value, principal);
        prop_assert!(schedule.items.iter().all(|item| item.nominal >= Decimal::ZERO));
    }

    /// A solved monthly plan discounts back to the principal within one unit.
    #[test]
    fn prop_solved_present_value_matches_principal(
        principal in principal(),
        start in start_date(),
        n in 1u32..=60,
        rate in rate(),
        convention in convention(),
    ) {
        let terms = LoanTerms {
            principal,
            monthly_rate: rate,
            start_date: start,
            payment_count: n,
            modality: Modality::Monthly,
            day_count: convention,
        };
        let schedule = compute_schedule(&terms, KnownValues::unknown(), &SpecialOverrides::new()).unwrap();
        prop_assert!((schedule.total.present_value - principal).abs() <= Decimal::ONE);
        prop_assert!(schedule.warnings.is_empty());
    }

    /// Every generated payment appears once, in due-date order.
    #[test]
    fn prop_items_cover_plan_in_order(
        start in start_date(),
        n in 1u32..=60,
        semiannual in any::<bool>(),
    ) {
        let period = if semiannual { BalloonPeriod::Semiannual } else { BalloonPeriod::Annual };
        let terms = LoanTerms {
            principal: Decimal::new(10_000_000, 2),
            monthly_rate: Decimal::new(89, 2),
            start_date: start,
            payment_count: n,
            modality: Modality::MonthlyWithBalloons { period, scheduling: BalloonScheduling::DefaultPeriodic },
            day_count: DayCountConvention::Commercial,
        };
        let known = KnownValues {
            installment: KnownValue::Known(Decimal::ZERO),
            balloon: KnownValue::Unknown,
        };
        let schedule = compute_schedule(&terms, known, &SpecialOverrides::new()).unwrap();
        let expected = n + terms.balloon_count();
        prop_assert_eq!(schedule.items.len(), expected as usize);
        prop_assert!(schedule.items.windows(2).all(|w| w[0].due_date <= w[1].due_date));
    }
}
