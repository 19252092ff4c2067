//! Simulation runs: request resolution, engine settings, and result caching.

pub mod cache;
pub mod engine;
pub mod error;
pub mod types;


pub use cache::SimulationCache;
pub use engine::SimulationEngine;
pub use error::SimulationError;
pub use types::{
    PriceBeginOutcome, PriceBeginRequest, ScheduleOutcome, ScheduleRequest, SimulationSettings,
};
