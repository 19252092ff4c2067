//! Property-based tests for Price-Begin amortization.

use chrono::NaiveDate;
use proptest::prelude::*;
use parcela_shared::types::round_money;
use rust_decimal::Decimal;

use super::service::compute_price_begin;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balances never grow or turn negative, the table closes at zero, and
    /// the principal is fully amortized.
    #[test]
    fn prop_table_closes_at_zero(
        cents in 100i64..100_000_000,
        rate_bp in 0i64..300,
        count in 1u32..=180,
        day in 1u32..=28,
    ) {
        let principal = Decimal::new(cents, 2);
        let start = NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let table = compute_price_begin(principal, Decimal::new(rate_bp, 2), count, start).unwrap();

        prop_assert_eq!(table.rows.len(), count as usize);
        prop_assert!(table.rows.windows(2).all(|w| w[1].balance <= w[0].balance));
        prop_assert!(table.rows.iter().all(|r| r.payment >= Decimal::ZERO));
        prop_assert!(table.rows.iter().all(|r| r.amortization >= Decimal::ZERO));
        prop_assert!(table.rows.iter().all(|r| r.balance >= Decimal::ZERO));
        prop_assert_eq!(table.rows.last().unwrap().balance, Decimal::ZERO);
        prop_assert_eq!(table.rows[0].interest, Decimal::ZERO);

        let rate = Decimal::new(rate_bp, 4);
        for pair in table.rows.windows(2) {
            prop_assert_eq!(pair[1].interest, round_money(pair[0].balance * rate));
        }

        let amortized: Decimal = table.rows.iter().map(|r| r.amortization).sum();
        prop_assert_eq!(amortized, principal);
        prop_assert_eq!(table.total_paid - table.total_interest, principal);
    }
}
