//! Annuity-due (Price-Begin) amortization.
//!
//! The first payment is due on the contract date and carries no interest.
//! Every later row charges interest on the previous balance; the last row
//! amortizes whatever balance is left so the table closes at zero.

use chrono::{Datelike, NaiveDate};
use parcela_shared::types::{Money, round_money, settle_dust, sum_money, truncate_money};
use rust_decimal::{Decimal, MathematicalOps};
use tracing::debug;

use super::error::PriceBeginError;
use super::types::{AmortizationRow, PriceBeginSchedule, PriceBeginTerms};
use crate::calendar::{PeriodKind, adjust_due_date};

/// Default ceiling on the number of payments.
pub const DEFAULT_MAX_INSTALLMENTS: u32 = 180;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Price-Begin amortization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBeginService {
    max_installments: u32,
}

impl Default for PriceBeginService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INSTALLMENTS)
    }
}

impl PriceBeginService {
    /// Creates an engine accepting at most `max_installments` payments.
    #[must_use]
    pub const fn new(max_installments: u32) -> Self {
        Self { max_installments }
    }

    /// Largest accepted installment count.
    #[must_use]
    pub const fn max_installments(&self) -> u32 {
        self.max_installments
    }

    /// Fixed annuity-due payment `P / (1 + (1 - (1+i)^-(N-1)) / i)`.
    ///
    /// A non-positive rate splits the principal evenly, truncated to cents so
    /// the last row takes the leftover. Zero payments yield zero.
    ///
    /// # Errors
    ///
    /// Returns an error when the rate cannot be compounded over the term.
    pub fn fixed_payment(principal: Money, monthly_rate: Decimal, count: u32) -> Result<Money, PriceBeginError> {
        if count == 0 {
            return Ok(round_money(Decimal::ZERO));
        }
        let rate = monthly_rate / HUNDRED;
        if rate <= Decimal::ZERO {
            return Ok(truncate_money(principal / Decimal::from(count)));
        }

        let out_of_range = || PriceBeginError::RateOutOfRange {
            rate: monthly_rate,
            count,
        };
        let growth = (Decimal::ONE + rate)
            .checked_powi(i64::from(count - 1))
            .filter(|g| !g.is_zero())
            .ok_or_else(out_of_range)?;
        let annuity = (Decimal::ONE - Decimal::ONE / growth)
            .checked_div(rate)
            .ok_or_else(out_of_range)?;
        principal
            .checked_div(Decimal::ONE + annuity)
            .map(round_money)
            .ok_or_else(out_of_range)
    }

    /// Builds the full amortization table.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive principal, a count above the
    /// ceiling, or a rate that cannot be compounded.
    pub fn amortize(&self, terms: &PriceBeginTerms) -> Result<PriceBeginSchedule, PriceBeginError> {
        if terms.principal <= Decimal::ZERO {
            return Err(PriceBeginError::NonPositivePrincipal(terms.principal));
        }
        let count = terms.installment_count;
        if count > self.max_installments {
            return Err(PriceBeginError::TooManyInstallments {
                count,
                max: self.max_installments,
            });
        }

        let principal = round_money(terms.principal);
        let fixed_payment = Self::fixed_payment(principal, terms.monthly_rate, count)?;
        let rate = (terms.monthly_rate / HUNDRED).max(Decimal::ZERO);
        debug!(%principal, %fixed_payment, count, "Price-Begin payment computed");

        let rows = build_rows(principal, fixed_payment, rate, count, terms.start_date);
        let total_paid = sum_money(rows.iter().map(|row| &row.payment));
        let total_interest = sum_money(rows.iter().map(|row| &row.interest));

        Ok(PriceBeginSchedule {
            principal,
            monthly_rate: terms.monthly_rate,
            fixed_payment,
            rows,
            total_paid,
            total_interest,
        })
    }
}

/// Amortization table with the default installment ceiling.
///
/// # Errors
///
/// See [`PriceBeginService::amortize`].
pub fn compute_price_begin(
    principal: Money,
    monthly_rate: Decimal,
    installment_count: u32,
    start_date: NaiveDate,
) -> Result<PriceBeginSchedule, PriceBeginError> {
    PriceBeginService::default().amortize(&PriceBeginTerms {
        principal,
        monthly_rate,
        start_date,
        installment_count,
    })
}

fn build_rows(
    principal: Money,
    fixed_payment: Money,
    rate: Decimal,
    count: u32,
    start: NaiveDate,
) -> Vec<AmortizationRow> {
    let anchor = start.day();
    let mut rows = Vec::with_capacity(count as usize);
    let mut balance = principal;

    for number in 1..=count {
        let interest = if number == 1 {
            round_money(Decimal::ZERO)
        } else {
            round_money(balance * rate)
        };
        // Amortization never exceeds what is still owed.
        let amortization = if number == count {
            balance
        } else {
            round_money(fixed_payment - interest).clamp(Decimal::ZERO, balance)
        };
        let payment = round_money(amortization + interest);
        balance = settle_dust(round_money(balance - amortization));

        rows.push(AmortizationRow {
            number,
            label: format!("Parcela {number}"),
            due_date: adjust_due_date(start, PeriodKind::Monthly, number - 1, anchor),
            payment,
            interest,
            amortization,
            balance,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_table() {
        let table = compute_price_begin(dec!(37000.00), dec!(0.395), 12, date(2025, 3, 31)).unwrap();

        assert_eq!(table.fixed_payment, dec!(3150.63));
        assert_eq!(table.rows.len(), 12);

        let first = &table.rows[0];
        assert_eq!(first.interest, dec!(0.00));
        assert_eq!(first.amortization, dec!(3150.63));
        assert_eq!(first.balance, dec!(33849.37));
        assert_eq!(first.due_date, date(2025, 3, 31));

        let second = &table.rows[1];
        assert_eq!(second.interest, dec!(133.71));
        assert_eq!(second.amortization, dec!(3016.92));
        assert_eq!(second.balance, dec!(30832.45));
        assert_eq!(second.due_date, date(2025, 4, 30));

        let last = &table.rows[11];
        assert_eq!(last.interest, dec!(12.40));
        assert_eq!(last.amortization, dec!(3138.16));
        assert_eq!(last.payment, dec!(3150.56));
        assert_eq!(last.balance, dec!(0.00));
        assert_eq!(last.due_date, date(2026, 2, 28));

        assert_eq!(table.total_paid, dec!(37807.49));
        assert_eq!(table.total_interest, dec!(807.49));
    }

    #[test]
    fn test_single_payment_is_the_principal() {
        let table = compute_price_begin(dec!(5000.00), dec!(1), 1, date(2025, 1, 10)).unwrap();
        assert_eq!(table.fixed_payment, dec!(5000.00));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].payment, dec!(5000.00));
        assert_eq!(table.rows[0].balance, dec!(0.00));
    }

    #[test]
    fn test_zero_rate_splits_evenly_and_closes() {
        let table = compute_price_begin(dec!(1000.00), dec!(0), 3, date(2025, 1, 10)).unwrap();
        let payments: Vec<Decimal> = table.rows.iter().map(|r| r.payment).collect();
        assert_eq!(payments, vec![dec!(333.33), dec!(333.33), dec!(333.34)]);
        assert_eq!(table.total_interest, dec!(0.00));
        assert_eq!(table.total_paid, dec!(1000.00));
    }

    #[test]
    fn test_small_principal_over_long_term_stays_non_negative() {
        let table = compute_price_begin(dec!(100.00), dec!(0), 180, date(2025, 1, 10)).unwrap();

        assert_eq!(table.fixed_payment, dec!(0.55));
        assert!(table.rows.iter().all(|r| r.payment >= Decimal::ZERO && r.balance >= Decimal::ZERO));
        assert!(table.rows.windows(2).all(|w| w[1].balance <= w[0].balance));

        let last = &table.rows[179];
        assert_eq!(last.payment, dec!(1.55));
        assert_eq!(last.balance, dec!(0.00));
        assert_eq!(table.total_paid, dec!(100.00));
    }

    #[test]
    fn test_amortization_capped_at_remaining_balance() {
        let rows = build_rows(dec!(1.00), dec!(0.40), Decimal::ZERO, 4, date(2025, 1, 10));
        let amortizations: Vec<Decimal> = rows.iter().map(|r| r.amortization).collect();
        assert_eq!(amortizations, vec![dec!(0.40), dec!(0.40), dec!(0.20), dec!(0.00)]);
        assert_eq!(rows[2].payment, dec!(0.20));
        assert!(rows.iter().all(|r| r.balance >= Decimal::ZERO));
    }

    #[test]
    fn test_zero_installments_yield_empty_table() {
        let table = compute_price_begin(dec!(1000.00), dec!(0.79), 0, date(2025, 1, 10)).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.total_paid, dec!(0));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_rejects_non_positive_principal(#[case] principal: Decimal) {
        let result = compute_price_begin(principal, dec!(0.79), 12, date(2025, 1, 10));
        assert_eq!(result, Err(PriceBeginError::NonPositivePrincipal(principal)));
    }

    #[test]
    fn test_rejects_count_above_ceiling() {
        let service = PriceBeginService::new(24);
        let terms = PriceBeginTerms {
            principal: dec!(1000),
            monthly_rate: dec!(0.79),
            start_date: date(2025, 1, 10),
            installment_count: 25,
        };
        assert_eq!(
            service.amortize(&terms),
            Err(PriceBeginError::TooManyInstallments { count: 25, max: 24 })
        );
    }

    #[test]
    fn test_huge_rate_is_out_of_range() {
        let result = PriceBeginService::fixed_payment(dec!(1000), dec!(100000), 180);
        assert!(matches!(result, Err(PriceBeginError::RateOutOfRange { .. })));
    }
}
