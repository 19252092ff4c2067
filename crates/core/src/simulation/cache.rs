//! Simulation result caching using Moka.
//!
//! Runs are pure functions of their inputs and the engine settings, so
//! results are cached under the parameter hash. Rejected runs are never cached.

use moka::sync::Cache;
use parcela_shared::SimulationConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::engine::SimulationEngine;
use super::error::SimulationError;
use super::types::{
    PriceBeginOutcome, PriceBeginRequest, ScheduleOutcome, ScheduleRequest, SimulationSettings,
};

/// Default cache capacity (number of entries per result kind).
const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Default time-to-live for cache entries (1 hour).
const DEFAULT_TTL_SECS: u64 = 3600;

/// Cache for simulation results.
///
/// Thread-safe and cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct SimulationCache {
    engine: SimulationEngine,
    schedules: Cache<String, Arc<ScheduleOutcome>>,
    tables: Cache<String, Arc<PriceBeginOutcome>>,
}

impl SimulationCache {
    /// Creates a cache with default engine settings and limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimulationEngine::default(), DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache around `engine` with custom limits.
    #[must_use]
    pub fn with_config(engine: SimulationEngine, max_capacity: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        Self {
            engine,
            schedules: Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build(),
            tables: Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build(),
        }
    }

    /// Creates a cache from application configuration.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        let engine = SimulationEngine::new(SimulationSettings::from(config));
        Self::with_config(engine, config.cache_capacity, config.cache_ttl_secs)
    }

    /// Engine used on cache misses.
    #[must_use]
    pub const fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Runs a schedule simulation, returning a cached result if available.
    ///
    /// # Errors
    ///
    /// Returns an error when the inputs are rejected.
    pub fn run_schedule_cached(&self, request: &ScheduleRequest) -> Result<ScheduleOutcome, SimulationError> {
        let cache_key = self.engine.hash_schedule(request)?;

        if let Some(cached) = self.schedules.get(&cache_key) {
            debug!(hash = %cache_key, "Schedule cache hit");
            let mut outcome = (*cached).clone();
            outcome.cached = true;
            return Ok(outcome);
        }

        debug!(hash = %cache_key, "Schedule cache miss");
        let outcome = self.engine.run_schedule(request)?;
        self.schedules.insert(cache_key, Arc::new(outcome.clone()));
        Ok(outcome)
    }

    /// Runs a Price-Begin simulation, returning a cached result if available.
    ///
    /// # Errors
    ///
    /// Returns an error when the inputs are rejected.
    pub fn run_price_begin_cached(
        &self,
        request: &PriceBeginRequest,
    ) -> Result<PriceBeginOutcome, SimulationError> {
        let cache_key = self.engine.hash_price_begin(request)?;

        if let Some(cached) = self.tables.get(&cache_key) {
            debug!(hash = %cache_key, "Price-Begin cache hit");
            let mut outcome = (*cached).clone();
            outcome.cached = true;
            return Ok(outcome);
        }

        debug!(hash = %cache_key, "Price-Begin cache miss");
        let outcome = self.engine.run_price_begin(request)?;
        self.tables.insert(cache_key, Arc::new(outcome.clone()));
        Ok(outcome)
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.schedules.invalidate_all();
        self.tables.invalidate_all();
    }

    /// Invalidates the cached result of a schedule request.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be hashed.
    pub fn invalidate_schedule(&self, request: &ScheduleRequest) -> Result<(), SimulationError> {
        let cache_key = self.engine.hash_schedule(request)?;
        self.schedules.invalidate(&cache_key);
        Ok(())
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.schedules.entry_count() + self.tables.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka evicts in the background; calling this makes counts and
    /// invalidations visible immediately.
    pub fn run_pending_tasks(&self) {
        self.schedules.run_pending_tasks();
        self.tables.run_pending_tasks();
    }
}

impl Default for SimulationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{BalloonPeriod, BalloonScheduling, KnownValues, Modality, SpecialOverrides};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn create_schedule_request() -> ScheduleRequest {
        ScheduleRequest {
            total_price: dec!(150000),
            down_payment: dec!(30000),
            monthly_rate: dec!(0.89),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            payment_count: 48,
            modality: Modality::Monthly,
            known: KnownValues::unknown(),
            special_balloons: SpecialOverrides::new(),
        }
    }

    fn create_price_begin_request() -> PriceBeginRequest {
        PriceBeginRequest {
            total_price: dec!(47000),
            down_payment: dec!(10000),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            installment_count: 12,
            monthly_rate: Some(dec!(0.395)),
        }
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = SimulationCache::new();
        let request = create_schedule_request();

        let first = cache.run_schedule_cached(&request).unwrap();
        assert!(!first.cached, "First call should not be cached");

        let second = cache.run_schedule_cached(&request).unwrap();
        assert!(second.cached, "Second call should be cached");

        assert_eq!(first.parameters_hash, second.parameters_hash);
        assert_eq!(first.simulation_id, second.simulation_id);
        assert_eq!(first.schedule, second.schedule);
    }

    #[test]
    fn test_different_params_not_cached() {
        let cache = SimulationCache::new();
        let request1 = create_schedule_request();
        let mut request2 = create_schedule_request();
        request2.payment_count = 60;

        assert!(!cache.run_schedule_cached(&request1).unwrap().cached);
        assert!(!cache.run_schedule_cached(&request2).unwrap().cached, "Different params should not hit cache");
        assert!(cache.run_schedule_cached(&request1).unwrap().cached, "Same params should hit cache");
    }

    #[test]
    fn test_rejected_runs_are_not_cached() {
        let cache = SimulationCache::new();
        let mut request = create_schedule_request();
        request.down_payment = request.total_price;

        assert!(cache.run_schedule_cached(&request).is_err());
        cache.run_pending_tasks();
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_price_begin_cached_separately() {
        let cache = SimulationCache::new();
        let request = create_price_begin_request();

        let first = cache.run_price_begin_cached(&request).unwrap();
        assert!(!first.cached);
        assert_eq!(first.table.principal, dec!(37000.00));

        let second = cache.run_price_begin_cached(&request).unwrap();
        assert!(second.cached);
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = SimulationCache::new();
        let request = create_schedule_request();

        let _ = cache.run_schedule_cached(&request).unwrap();
        assert!(cache.run_schedule_cached(&request).unwrap().cached);

        cache.invalidate_all();
        cache.run_pending_tasks();

        assert!(!cache.run_schedule_cached(&request).unwrap().cached, "Should be cache miss after invalidate_all");
    }

    #[test]
    fn test_invalidate_specific() {
        let cache = SimulationCache::new();
        let mixed = ScheduleRequest {
            modality: Modality::MonthlyWithBalloons {
                period: BalloonPeriod::Annual,
                scheduling: BalloonScheduling::DefaultPeriodic,
            },
            known: KnownValues {
                installment: crate::schedule::KnownValue::Known(dec!(1500)),
                balloon: crate::schedule::KnownValue::Unknown,
            },
            ..create_schedule_request()
        };
        let monthly = create_schedule_request();

        let _ = cache.run_schedule_cached(&mixed).unwrap();
        let _ = cache.run_schedule_cached(&monthly).unwrap();

        cache.invalidate_schedule(&mixed).unwrap();
        cache.run_pending_tasks();

        assert!(!cache.run_schedule_cached(&mixed).unwrap().cached, "Invalidated params should be cache miss");
        assert!(cache.run_schedule_cached(&monthly).unwrap().cached, "Non-invalidated params should still hit cache");
    }

    #[test]
    fn test_settings_change_the_key() {
        let request = create_schedule_request();
        let commercial = SimulationCache::new();
        let actual = SimulationCache::from_config(&SimulationConfig {
            day_count: parcela_shared::types::DayCountConvention::Actual,
            ..SimulationConfig::default()
        });

        let a = commercial.run_schedule_cached(&request).unwrap();
        let b = actual.run_schedule_cached(&request).unwrap();
        assert_ne!(a.parameters_hash, b.parameters_hash);
    }

    #[test]
    fn test_entry_count() {
        let cache = SimulationCache::with_config(SimulationEngine::default(), 10, 60);
        assert_eq!(cache.entry_count(), 0);

        let _ = cache.run_schedule_cached(&create_schedule_request()).unwrap();
        let _ = cache.run_price_begin_cached(&create_price_begin_request()).unwrap();

        cache.run_pending_tasks();
        assert_eq!(cache.entry_count(), 2);
    }
}
