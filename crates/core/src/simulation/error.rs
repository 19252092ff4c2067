//! Simulation error types.

use parcela_shared::AppError;
use thiserror::Error;

use crate::price_begin::PriceBeginError;
use crate::schedule::ScheduleError;

/// Simulation-related errors.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Schedule inputs rejected.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Price-Begin inputs rejected.
    #[error(transparent)]
    PriceBegin(#[from] PriceBeginError),

    /// Parameters could not be serialized for hashing.
    #[error("Failed to hash simulation parameters: {0}")]
    Hashing(#[from] serde_json::Error),
}

impl From<SimulationError> for AppError {
    fn from(e: SimulationError) -> Self {
        match e {
            SimulationError::Schedule(inner) => inner.into(),
            SimulationError::PriceBegin(inner) => inner.into(),
            SimulationError::Hashing(inner) => Self::Internal(inner.to_string()),
        }
    }
}
