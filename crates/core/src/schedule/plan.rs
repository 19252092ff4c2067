//! Due-date planning per modality.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::ScheduleError;
use super::types::{BalloonPeriod, BalloonScheduling, LoanTerms, Modality};
use crate::calendar::{PeriodKind, adjust_due_date};

/// Due dates of both payment groups, in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuePlan {
    /// Installment due dates; index `i` holds installment `i + 1`.
    pub installments: Vec<NaiveDate>,
    /// Balloon due dates; index `k` holds balloon `k + 1`.
    pub balloons: Vec<NaiveDate>,
}

impl DuePlan {
    /// Plans every due date of `terms`.
    ///
    /// # Errors
    ///
    /// Returns an error when a balloon month falls outside the installments.
    pub fn for_terms(terms: &LoanTerms) -> Result<Self, ScheduleError> {
        let start = terms.start_date;
        let anchor = terms.anchor_day();
        let n = terms.payment_count;

        let plan = match &terms.modality {
            Modality::Monthly => Self {
                installments: monthly_dates(start, anchor, n),
                balloons: Vec::new(),
            },
            Modality::MonthlyWithBalloons { period, scheduling } => Self {
                installments: monthly_dates(start, anchor, n),
                balloons: mixed_balloon_dates(start, anchor, n, *period, scheduling)?,
            },
            Modality::AnnualBalloons => Self {
                installments: Vec::new(),
                balloons: periodic_dates(start, anchor, PeriodKind::Annual, n),
            },
            Modality::SemiannualBalloons => Self {
                installments: Vec::new(),
                balloons: periodic_dates(start, anchor, PeriodKind::Semiannual, n),
            },
        };
        Ok(plan)
    }
}

fn monthly_dates(start: NaiveDate, anchor: u32, count: u32) -> Vec<NaiveDate> {
    periodic_dates(start, anchor, PeriodKind::Monthly, count)
}

fn periodic_dates(start: NaiveDate, anchor: u32, period: PeriodKind, count: u32) -> Vec<NaiveDate> {
    (1..=count)
        .map(|i| adjust_due_date(start, period, i, anchor))
        .collect()
}

fn mixed_balloon_dates(
    start: NaiveDate,
    anchor: u32,
    installments: u32,
    period: BalloonPeriod,
    scheduling: &BalloonScheduling,
) -> Result<Vec<NaiveDate>, ScheduleError> {
    let interval = period.interval();
    let count = installments / interval;

    match scheduling {
        BalloonScheduling::DefaultPeriodic => {
            Ok(periodic_dates(start, anchor, period.period_kind(), count))
        }
        BalloonScheduling::FromFirstDueDate { first_month } => {
            let first = *first_month;
            if first == 0 || first > installments {
                return Err(ScheduleError::InvalidFirstBalloonMonth {
                    month: first,
                    installments,
                });
            }
            // Offsets stay relative to the start so the anchor never drifts.
            Ok((0..count)
                .map(|k| {
                    let months = first.saturating_add(k.saturating_mul(interval));
                    adjust_due_date(start, PeriodKind::Monthly, months, anchor)
                })
                .collect())
        }
        BalloonScheduling::CustomMonths { months } => {
            let unique: BTreeSet<u32> = months.iter().copied().collect();
            if let Some(&month) = unique.iter().find(|m| **m == 0 || **m > installments) {
                return Err(ScheduleError::InvalidBalloonMonth {
                    month,
                    installments,
                });
            }
            Ok(unique
                .into_iter()
                .map(|m| adjust_due_date(start, PeriodKind::Monthly, m, anchor))
                .collect())
        }
    }
}
