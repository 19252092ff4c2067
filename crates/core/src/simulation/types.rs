//! Simulation request and outcome types.

use chrono::NaiveDate;
use parcela_shared::SimulationConfig;
use parcela_shared::types::{DayCountConvention, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::price_begin::PriceBeginSchedule;
use crate::rates::{RateBundle, RatePolicy};
use crate::schedule::{KnownValues, Modality, Schedule, SpecialOverrides};

/// Engine-wide settings applied to every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Day-count convention for discounting.
    pub day_count: DayCountConvention,
    /// Rate policy for schedule runs.
    pub rate_policy: RatePolicy,
    /// Allowed gap between total present value and principal.
    pub consistency_tolerance: Decimal,
    /// Ceiling on Price-Begin installment counts.
    pub max_price_begin_installments: u32,
    /// Ceiling on schedule payment counts.
    pub max_schedule_payments: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for SimulationSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            day_count: config.day_count,
            rate_policy: RatePolicy::PromotionalWindow {
                max_installments: config.promotional_max_installments,
            },
            consistency_tolerance: config.consistency_tolerance,
            max_price_begin_installments: config.max_price_begin_installments,
            max_schedule_payments: config.max_schedule_payments,
        }
    }
}

/// Inputs of a schedule simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Property price.
    pub total_price: Money,
    /// Down payment (entrada).
    pub down_payment: Money,
    /// Requested monthly rate, in percent.
    pub monthly_rate: Decimal,
    /// Contract start date.
    pub start_date: NaiveDate,
    /// Installment count, or balloon count for balloon-only modalities.
    pub payment_count: u32,
    /// Payment modality.
    pub modality: Modality,
    /// Caller-supplied uniform values.
    #[serde(default)]
    pub known: KnownValues,
    /// Special balloon overrides by ordinal.
    #[serde(default)]
    pub special_balloons: SpecialOverrides,
}

/// Inputs of a Price-Begin simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBeginRequest {
    /// Property price.
    pub total_price: Money,
    /// Down payment (entrada).
    pub down_payment: Money,
    /// Contract date; first payment is due on it.
    pub start_date: NaiveDate,
    /// Number of payments.
    pub installment_count: u32,
    /// Explicit monthly rate in percent; tiered by count when absent.
    #[serde(default)]
    pub monthly_rate: Option<Decimal>,
}

/// Result of a schedule simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Unique simulation ID.
    pub simulation_id: Uuid,
    /// Hash of the parameters (for caching).
    pub parameters_hash: String,
    /// Rates derived from the effective monthly rate.
    pub rates: RateBundle,
    /// The computed schedule.
    pub schedule: Schedule,
    /// Whether this result was returned from cache.
    pub cached: bool,
}

/// Result of a Price-Begin simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBeginOutcome {
    /// Unique simulation ID.
    pub simulation_id: Uuid,
    /// Hash of the parameters (for caching).
    pub parameters_hash: String,
    /// The amortization table.
    pub table: PriceBeginSchedule,
    /// Whether this result was returned from cache.
    pub cached: bool,
}
