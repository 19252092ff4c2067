//! Financing schedule solver.
//!
//! This module implements:
//! - Modality and known-value types
//! - Due-date planning per modality
//! - Solving the unknown uniform value against the financed principal
//! - Special balloon overrides
//! - Schedule assembly with a total row and consistency warnings

pub mod error;
pub mod plan;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use error::ScheduleError;
pub use plan::DuePlan;
pub use service::{DEFAULT_CONSISTENCY_TOLERANCE, DEFAULT_MAX_PAYMENTS, ScheduleService, compute_schedule};
pub use types::{
    BalloonPeriod, BalloonScheduling, CashFlowItem, CashFlowKind, KnownValue, KnownValues, LoanTerms,
    Modality, Schedule, ScheduleTotal, SpecialOverrides,
};
pub use validation::{financed_principal, validate_inputs};
