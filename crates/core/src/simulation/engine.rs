//! Simulation engine: turns requests into engine inputs and runs them.

use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::SimulationError;
use super::types::{
    PriceBeginOutcome, PriceBeginRequest, ScheduleOutcome, ScheduleRequest, SimulationSettings,
};
use crate::price_begin::{PriceBeginService, PriceBeginTerms};
use crate::rates::{RateBundle, RatePolicy};
use crate::schedule::{LoanTerms, ScheduleService, financed_principal};

/// Engine for running financing simulations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationEngine {
    settings: SimulationSettings,
}

impl SimulationEngine {
    /// Creates an engine with the given settings.
    #[must_use]
    pub const fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    /// Settings applied to every run.
    #[must_use]
    pub const fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Resolves a request into loan terms: financed principal plus the
    /// rate the policy actually applies.
    ///
    /// # Errors
    ///
    /// Returns an error when price and down payment are inconsistent.
    pub fn loan_terms(&self, request: &ScheduleRequest) -> Result<LoanTerms, SimulationError> {
        let principal = financed_principal(request.total_price, request.down_payment)?;
        let monthly_rate = self.settings.rate_policy.effective_percent(
            request.monthly_rate,
            request.payment_count,
            request.modality.is_monthly_only(),
        );
        if monthly_rate != request.monthly_rate {
            debug!(requested = %request.monthly_rate, applied = %monthly_rate, "Rate policy adjusted the monthly rate");
        }
        Ok(LoanTerms {
            principal,
            monthly_rate,
            start_date: request.start_date,
            payment_count: request.payment_count,
            modality: request.modality.clone(),
            day_count: self.settings.day_count,
        })
    }

    /// Resolves a Price-Begin request into amortization terms.
    ///
    /// Without an explicit rate the tiered product rate applies.
    ///
    /// # Errors
    ///
    /// Returns an error when price and down payment are inconsistent.
    pub fn price_begin_terms(&self, request: &PriceBeginRequest) -> Result<PriceBeginTerms, SimulationError> {
        let principal = financed_principal(request.total_price, request.down_payment)?;
        let monthly_rate = request.monthly_rate.unwrap_or_else(|| {
            RatePolicy::Tiered.effective_percent(Decimal::ZERO, request.installment_count, true)
        });
        Ok(PriceBeginTerms {
            principal,
            monthly_rate,
            start_date: request.start_date,
            installment_count: request.installment_count,
        })
    }

    /// Runs a schedule simulation.
    ///
    /// # Errors
    ///
    /// Returns an error when the inputs are rejected.
    pub fn run_schedule(&self, request: &ScheduleRequest) -> Result<ScheduleOutcome, SimulationError> {
        let parameters_hash = self.hash_schedule(request)?;
        let terms = self.loan_terms(request)?;
        let rates = RateBundle::from_monthly_percent(terms.monthly_rate, terms.day_count);
        let schedule = ScheduleService::new(self.settings.consistency_tolerance)
            .with_max_payments(self.settings.max_schedule_payments)
            .compute(&terms, request.known, &request.special_balloons)?;

        info!(
            principal = %schedule.principal,
            items = schedule.items.len(),
            solved = schedule.solved,
            warnings = schedule.warnings.len(),
            "Schedule simulation completed"
        );

        Ok(ScheduleOutcome {
            simulation_id: Uuid::new_v4(),
            parameters_hash,
            rates,
            schedule,
            cached: false,
        })
    }

    /// Runs a Price-Begin simulation.
    ///
    /// # Errors
    ///
    /// Returns an error when the inputs are rejected.
    pub fn run_price_begin(&self, request: &PriceBeginRequest) -> Result<PriceBeginOutcome, SimulationError> {
        let parameters_hash = self.hash_price_begin(request)?;
        let terms = self.price_begin_terms(request)?;
        let table = PriceBeginService::new(self.settings.max_price_begin_installments).amortize(&terms)?;

        info!(
            principal = %table.principal,
            rows = table.rows.len(),
            fixed_payment = %table.fixed_payment,
            "Price-Begin simulation completed"
        );

        Ok(PriceBeginOutcome {
            simulation_id: Uuid::new_v4(),
            parameters_hash,
            table,
            cached: false,
        })
    }

    /// Cache key of a schedule request under these settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be serialized.
    pub fn hash_schedule(&self, request: &ScheduleRequest) -> Result<String, SimulationError> {
        self.hash_params("schedule", request)
    }

    /// Cache key of a Price-Begin request under these settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be serialized.
    pub fn hash_price_begin(&self, request: &PriceBeginRequest) -> Result<String, SimulationError> {
        self.hash_params("price_begin", request)
    }

    fn hash_params<T: Serialize>(&self, kind: &str, request: &T) -> Result<String, SimulationError> {
        let payload = serde_json::to_vec(&(kind, &self.settings, request))?;
        let mut hasher = Sha256::new();
        hasher.update(&payload);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
