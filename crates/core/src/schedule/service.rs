//! Schedule solver.
//!
//! Builds the dated cash flows of a plan, solves whichever uniform value
//! was left unknown so that the present values add up to the financed
//! principal, and assembles the final table.

use chrono::NaiveDate;
use parcela_shared::types::{Money, round_money, sum_money, truncate_money};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error::ScheduleError;
use super::plan::DuePlan;
use super::types::{
    CashFlowItem, CashFlowKind, KnownValue, KnownValues, LoanTerms, Schedule, ScheduleTotal,
    SpecialOverrides,
};
use super::validation::validate_inputs;
use crate::present_value::Discounter;
use crate::rates::RateBundle;

/// Default allowed gap between the present-value sum and the principal.
pub const DEFAULT_CONSISTENCY_TOLERANCE: Decimal = Decimal::ONE;

/// Default ceiling on the payment count of a plan (35 years of monthly payments).
pub const DEFAULT_MAX_PAYMENTS: u32 = 420;

/// Uniform value of a payment group.
///
/// Under a zero rate the uniform value is truncated to cents and the last
/// item absorbs the non-negative residual, so the group sums exactly to its
/// share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupValue {
    uniform: Money,
    last: Money,
}

impl GroupValue {
    const fn flat(value: Money) -> Self {
        Self {
            uniform: value,
            last: value,
        }
    }

    const fn at(self, index: usize, len: usize) -> Money {
        if index + 1 == len { self.last } else { self.uniform }
    }
}

/// A balloon slot and, for special balloons, its fixed value.
#[derive(Debug, Clone, Copy)]
struct BalloonSlot {
    ordinal: u32,
    due: NaiveDate,
    special: Option<Money>,
}

/// Result of the solve step.
#[derive(Debug, Clone, Copy)]
struct Resolution {
    installment: Option<GroupValue>,
    balloon: Option<GroupValue>,
    solved: bool,
}

/// One payment group as seen by the solver.
#[derive(Debug, Clone, Copy)]
struct Group {
    len: usize,
    factor: Decimal,
    known: KnownValue,
}

impl Group {
    const fn is_present(&self) -> bool {
        self.len > 0
    }
}

/// Schedule solver with a configurable consistency tolerance and payment ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleService {
    tolerance: Decimal,
    max_payments: u32,
}

impl Default for ScheduleService {
    fn default() -> Self {
        Self::new(DEFAULT_CONSISTENCY_TOLERANCE)
    }
}

impl ScheduleService {
    /// Creates a solver that warns when the present-value sum drifts more
    /// than `tolerance` from the principal.
    #[must_use]
    pub const fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance,
            max_payments: DEFAULT_MAX_PAYMENTS,
        }
    }

    /// Sets the largest accepted payment count.
    #[must_use]
    pub const fn with_max_payments(mut self, max_payments: u32) -> Self {
        self.max_payments = max_payments;
        self
    }

    /// Consistency tolerance in currency units.
    #[must_use]
    pub const fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Largest accepted payment count.
    #[must_use]
    pub const fn max_payments(&self) -> u32 {
        self.max_payments
    }

    /// Computes the schedule for `terms`.
    ///
    /// `known` carries the caller-supplied uniform values; the unknown one is
    /// solved. `overrides` fixes individual balloons by ordinal. Overrides for
    /// ordinals the plan does not generate are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error when inputs are invalid or the payment count exceeds
    /// the ceiling, when special balloons or a
    /// supplied value exceed the principal, or when both values are unknown
    /// on a plan that has both installments and balloons.
    pub fn compute(
        &self,
        terms: &LoanTerms,
        known: KnownValues,
        overrides: &SpecialOverrides,
    ) -> Result<Schedule, ScheduleError> {
        validate_inputs(terms, known, overrides, self.max_payments)?;

        let rates = RateBundle::from_monthly_percent(terms.monthly_rate, terms.day_count);
        let discounter = Discounter::new(terms.start_date, rates.daily, terms.day_count);
        let plan = DuePlan::for_terms(terms)?;
        let mut warnings = Vec::new();

        let slots = balloon_slots(&plan.balloons, overrides, &mut warnings);

        let overrides_pv: Money = slots
            .iter()
            .filter_map(|slot| slot.special.map(|v| discounter.present_value(v, slot.due)))
            .sum();
        let remaining = terms.principal - overrides_pv;
        if remaining < Decimal::ZERO {
            return Err(ScheduleError::OverridesExceedPrincipal {
                overrides_pv,
                principal: terms.principal,
            });
        }

        let regular_dates: Vec<NaiveDate> = slots
            .iter()
            .filter(|slot| slot.special.is_none())
            .map(|slot| slot.due)
            .collect();

        let installments = Group {
            len: plan.installments.len(),
            factor: discounter.factor(&plan.installments),
            known: normalize(known.installment),
        };
        let balloons = Group {
            len: regular_dates.len(),
            factor: discounter.factor(&regular_dates),
            known: normalize(known.balloon),
        };

        let resolution = resolve(remaining, installments, balloons, discounter.is_identity())?;
        debug!(
            installment = ?resolution.installment.map(|g| g.uniform),
            balloon = ?resolution.balloon.map(|g| g.uniform),
            solved = resolution.solved,
            "Schedule values resolved"
        );

        let mut items = Vec::with_capacity(plan.installments.len() + slots.len());
        if let Some(value) = resolution.installment {
            let len = plan.installments.len();
            for (index, due) in plan.installments.iter().enumerate() {
                let ordinal = u32::try_from(index + 1).unwrap_or(u32::MAX);
                items.push(cash_flow_item(
                    &discounter,
                    CashFlowKind::Installment,
                    ordinal,
                    *due,
                    value.at(index, len),
                    false,
                ));
            }
        }

        let regular_len = regular_dates.len();
        let mut regular_index = 0;
        for slot in &slots {
            let (nominal, special) = match (slot.special, resolution.balloon) {
                (Some(value), _) => (value, true),
                (None, Some(value)) => {
                    let nominal = value.at(regular_index, regular_len);
                    regular_index += 1;
                    (nominal, false)
                }
                (None, None) => continue,
            };
            items.push(cash_flow_item(
                &discounter,
                CashFlowKind::Balloon,
                slot.ordinal,
                slot.due,
                nominal,
                special,
            ));
        }

        // Stable: installments stay ahead of balloons due the same day.
        items.sort_by_key(|item| item.due_date);

        let total = total_row(&items);
        if items.is_empty() {
            warn!(payment_count = terms.payment_count, "Schedule has no payments");
            warnings.push("The plan generated no payments".to_string());
        }
        self.check_consistency(terms.principal, &total, resolution.solved, &mut warnings);

        Ok(Schedule {
            items,
            total,
            principal: terms.principal,
            installment_value: resolution.installment.filter(|_| installments.is_present()).map(|g| g.uniform),
            balloon_value: resolution.balloon.filter(|_| balloons.is_present()).map(|g| g.uniform),
            monthly_rate: terms.monthly_rate,
            day_count: terms.day_count,
            solved: resolution.solved,
            warnings,
        })
    }

    fn check_consistency(
        &self,
        principal: Money,
        total: &ScheduleTotal,
        solved: bool,
        warnings: &mut Vec<String>,
    ) {
        let deviation = (total.present_value - principal).abs();
        if deviation <= self.tolerance {
            return;
        }
        warn!(
            %principal,
            present_value = %total.present_value,
            %deviation,
            solved,
            "Present values do not match the financed principal"
        );
        let message = if solved {
            format!(
                "Sum of present values {} deviates from financed principal {} by {}",
                total.present_value, principal, deviation
            )
        } else {
            format!(
                "Supplied values give a present value of {}, {} away from the financed principal {}",
                total.present_value, deviation, principal
            )
        };
        warnings.push(message);
    }
}

/// Computes a schedule with the default consistency tolerance.
///
/// # Errors
///
/// See [`ScheduleService::compute`].
pub fn compute_schedule(
    terms: &LoanTerms,
    known: KnownValues,
    overrides: &SpecialOverrides,
) -> Result<Schedule, ScheduleError> {
    ScheduleService::default().compute(terms, known, overrides)
}

fn normalize(value: KnownValue) -> KnownValue {
    match value {
        KnownValue::Known(v) => KnownValue::Known(round_money(v)),
        KnownValue::Unknown => KnownValue::Unknown,
    }
}

fn balloon_slots(
    dates: &[NaiveDate],
    overrides: &SpecialOverrides,
    warnings: &mut Vec<String>,
) -> Vec<BalloonSlot> {
    let count = dates.len();
    for ordinal in overrides.keys() {
        let in_range = usize::try_from(*ordinal).is_ok_and(|o| (1..=count).contains(&o));
        if !in_range {
            warn!(ordinal, balloons = count, "Ignoring override for a balloon the plan does not generate");
            warnings.push(format!("Special balloon {ordinal} ignored: the plan has {count} balloons"));
        }
    }

    dates
        .iter()
        .enumerate()
        .map(|(index, due)| {
            let ordinal = u32::try_from(index + 1).unwrap_or(u32::MAX);
            BalloonSlot {
                ordinal,
                due: *due,
                special: overrides.get(&ordinal).copied().map(round_money),
            }
        })
        .collect()
}

fn resolve(
    remaining: Money,
    installments: Group,
    balloons: Group,
    identity: bool,
) -> Result<Resolution, ScheduleError> {
    let resolution = match (installments.known, balloons.known) {
        (KnownValue::Known(p), KnownValue::Known(b)) => Resolution {
            installment: Some(GroupValue::flat(p)),
            balloon: Some(GroupValue::flat(b)),
            solved: false,
        },
        (KnownValue::Known(p), KnownValue::Unknown) => Resolution {
            installment: Some(GroupValue::flat(p)),
            balloon: solve_against(remaining, p, installments, balloons, "installment value", identity)?,
            solved: balloons.is_present(),
        },
        (KnownValue::Unknown, KnownValue::Known(b)) => Resolution {
            installment: solve_against(remaining, b, balloons, installments, "balloon value", identity)?,
            balloon: Some(GroupValue::flat(b)),
            solved: installments.is_present(),
        },
        (KnownValue::Unknown, KnownValue::Unknown) => {
            match (installments.is_present(), balloons.is_present()) {
                (true, true) => return Err(ScheduleError::Underdetermined),
                (true, false) => Resolution {
                    installment: Some(solve_group(remaining, installments, identity)),
                    balloon: None,
                    solved: true,
                },
                (false, true) => Resolution {
                    installment: None,
                    balloon: Some(solve_group(remaining, balloons, identity)),
                    solved: true,
                },
                (false, false) => Resolution {
                    installment: None,
                    balloon: None,
                    solved: false,
                },
            }
        }
    };
    Ok(resolution)
}

/// Solves `target` from whatever `fixed_value` across `fixed` leaves over.
fn solve_against(
    remaining: Money,
    fixed_value: Money,
    fixed: Group,
    target: Group,
    field: &str,
    identity: bool,
) -> Result<Option<GroupValue>, ScheduleError> {
    if !target.is_present() {
        return Ok(None);
    }
    let fixed_pv = fixed_value * fixed.factor;
    let residual = remaining - fixed_pv;
    if residual < Decimal::ZERO {
        return Err(ScheduleError::KnownValueExceedsPrincipal {
            field: field.to_string(),
            present_value: round_money(fixed_pv),
            available: remaining,
        });
    }
    Ok(Some(solve_group(round_money(residual), target, identity)))
}

fn solve_group(share: Money, group: Group, identity: bool) -> GroupValue {
    if identity {
        let count = Decimal::from(group.len);
        let base = truncate_money(share / count);
        let last = round_money(share - base * (count - Decimal::ONE));
        return GroupValue { uniform: base, last };
    }
    if group.factor <= Decimal::ZERO {
        warn!(%share, "Present-value factor vanished; group value set to zero");
        return GroupValue::flat(round_money(Decimal::ZERO));
    }
    GroupValue::flat(round_money(share / group.factor))
}

fn cash_flow_item(
    discounter: &Discounter,
    kind: CashFlowKind,
    ordinal: u32,
    due_date: NaiveDate,
    nominal: Money,
    special: bool,
) -> CashFlowItem {
    let present_value = discounter.present_value(nominal, due_date);
    CashFlowItem {
        label: format!("{} {ordinal}", kind.label_prefix()),
        kind,
        ordinal,
        due_date,
        elapsed_days: discounter.elapsed_days(due_date),
        nominal,
        present_value,
        discount: round_money(nominal - present_value),
        special,
    }
}

fn total_row(items: &[CashFlowItem]) -> ScheduleTotal {
    let nominal = sum_money(items.iter().map(|item| &item.nominal));
    let present_value = sum_money(items.iter().map(|item| &item.present_value));
    ScheduleTotal {
        nominal,
        present_value,
        discount: round_money(nominal - present_value),
    }
}
