//! Schedule data types.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use parcela_shared::types::date::dmy;
use parcela_shared::types::{DayCountConvention, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::PeriodKind;

/// Spacing of balloon payments layered on monthly installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalloonPeriod {
    /// One balloon every twelve months.
    Annual,
    /// One balloon every six months.
    Semiannual,
}

impl BalloonPeriod {
    /// Period used by the date adjuster.
    #[must_use]
    pub const fn period_kind(self) -> PeriodKind {
        match self {
            Self::Annual => PeriodKind::Annual,
            Self::Semiannual => PeriodKind::Semiannual,
        }
    }

    /// Installments between two balloons.
    #[must_use]
    pub const fn interval(self) -> u32 {
        self.period_kind().months()
    }
}

/// Where balloons fall within a monthly+balloon plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BalloonScheduling {
    /// Every 6th or 12th installment date.
    #[default]
    DefaultPeriodic,
    /// First balloon on installment `first_month`, the rest one balloon period apart.
    FromFirstDueDate {
        /// Installment index (1-based) of the first balloon.
        first_month: u32,
    },
    /// Balloons on exactly these installment indices (1-based).
    CustomMonths {
        /// Installment indices carrying a balloon.
        months: Vec<u32>,
    },
}

/// Payment modality of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modality {
    /// Monthly installments only.
    Monthly,
    /// Monthly installments plus balloons.
    MonthlyWithBalloons {
        /// Balloon spacing.
        period: BalloonPeriod,
        /// Balloon placement rule.
        #[serde(default)]
        scheduling: BalloonScheduling,
    },
    /// Annual balloons only.
    AnnualBalloons,
    /// Semiannual balloons only.
    SemiannualBalloons,
}

impl Modality {
    /// Returns true for plans made solely of monthly installments.
    #[must_use]
    pub const fn is_monthly_only(&self) -> bool {
        matches!(self, Self::Monthly)
    }

    /// Returns true when the plan has monthly installments.
    #[must_use]
    pub const fn has_installments(&self) -> bool {
        matches!(self, Self::Monthly | Self::MonthlyWithBalloons { .. })
    }
}

/// Terms of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Financed principal (price minus down payment), already rounded.
    pub principal: Money,
    /// Effective monthly nominal rate, in percent.
    pub monthly_rate: Decimal,
    /// Contract start date. Its day of month anchors every due date.
    pub start_date: NaiveDate,
    /// Number of installments, or of balloons for balloon-only modalities.
    pub payment_count: u32,
    /// Payment modality.
    pub modality: Modality,
    /// Day-count convention for discounting.
    #[serde(default)]
    pub day_count: DayCountConvention,
}

impl LoanTerms {
    /// Day of month every due date is pinned to.
    #[must_use]
    pub fn anchor_day(&self) -> u32 {
        self.start_date.day()
    }

    /// Number of balloons the modality generates.
    #[must_use]
    pub fn balloon_count(&self) -> u32 {
        match &self.modality {
            Modality::Monthly => 0,
            Modality::MonthlyWithBalloons { period, scheduling } => match scheduling {
                BalloonScheduling::CustomMonths { months } => {
                    let mut unique = months.clone();
                    unique.sort_unstable();
                    unique.dedup();
                    u32::try_from(unique.len()).unwrap_or(u32::MAX)
                }
                BalloonScheduling::DefaultPeriodic | BalloonScheduling::FromFirstDueDate { .. } => {
                    self.payment_count / period.interval()
                }
            },
            Modality::AnnualBalloons | Modality::SemiannualBalloons => self.payment_count,
        }
    }
}

/// A caller-side payment value: either supplied or left for the solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum KnownValue {
    /// Value supplied by the caller.
    Known(Money),
    /// Value to be solved.
    #[default]
    Unknown,
}

impl KnownValue {
    /// Returns the supplied value, if any.
    #[must_use]
    pub const fn value(self) -> Option<Money> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }
}

impl From<Option<Money>> for KnownValue {
    fn from(value: Option<Money>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

/// The two value slots a caller may fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownValues {
    /// Uniform monthly installment value.
    #[serde(default)]
    pub installment: KnownValue,
    /// Uniform regular balloon value.
    #[serde(default)]
    pub balloon: KnownValue,
}

impl KnownValues {
    /// Both slots left for the solver.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            installment: KnownValue::Unknown,
            balloon: KnownValue::Unknown,
        }
    }
}

/// Balloon ordinal (1-based) to a fixed nominal value that bypasses solving.
pub type SpecialOverrides = BTreeMap<u32, Money>;

/// Kind of cash-flow item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowKind {
    /// Monthly installment.
    Installment,
    /// Balloon payment.
    Balloon,
}

impl CashFlowKind {
    /// Display label prefix used on schedules.
    #[must_use]
    pub const fn label_prefix(self) -> &'static str {
        match self {
            Self::Installment => "Parcela",
            Self::Balloon => "Balão",
        }
    }
}

/// One dated payment of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowItem {
    /// Display label, e.g. "Parcela 3" or "Balão 2".
    pub label: String,
    /// Installment or balloon.
    pub kind: CashFlowKind,
    /// Position within its kind (1-based).
    pub ordinal: u32,
    /// Due date.
    #[serde(with = "dmy")]
    pub due_date: NaiveDate,
    /// Days from contract start under the run's convention.
    pub elapsed_days: i64,
    /// Nominal value.
    pub nominal: Money,
    /// Present value at contract start.
    pub present_value: Money,
    /// Nominal minus present value.
    pub discount: Money,
    /// True when the value came from a special override.
    pub special: bool,
}

/// Synthetic total row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotal {
    /// Sum of nominal values.
    pub nominal: Money,
    /// Sum of present values.
    pub present_value: Money,
    /// Aggregate discount.
    pub discount: Money,
}

/// A computed payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Items sorted by due date.
    pub items: Vec<CashFlowItem>,
    /// Total row.
    pub total: ScheduleTotal,
    /// Financed principal the schedule was built for.
    pub principal: Money,
    /// Uniform installment value (solved or supplied).
    pub installment_value: Option<Money>,
    /// Uniform regular balloon value (solved or supplied).
    pub balloon_value: Option<Money>,
    /// Effective monthly rate, in percent.
    pub monthly_rate: Decimal,
    /// Day-count convention used.
    pub day_count: DayCountConvention,
    /// Whether any value was solved.
    pub solved: bool,
    /// Non-blocking consistency warnings.
    pub warnings: Vec<String>,
}

impl Schedule {
    /// Items of the given kind, in due-date order.
    pub fn items_of(&self, kind: CashFlowKind) -> impl Iterator<Item = &CashFlowItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }
}
