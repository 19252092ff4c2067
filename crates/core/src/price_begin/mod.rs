//! Price-Begin (annuity-due) amortization tables.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PriceBeginError;
pub use service::{DEFAULT_MAX_INSTALLMENTS, PriceBeginService, compute_price_begin};
pub use types::{AmortizationRow, PriceBeginSchedule, PriceBeginTerms};
