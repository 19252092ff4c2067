//! Core financing engine for Parcela.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every run is a deterministic function of its inputs.
//!
//! # Modules
//!
//! - `rates` - Monthly rate conversion and rate policies
//! - `calendar` - Anchored due-date arithmetic
//! - `present_value` - Compound-interest discounting
//! - `schedule` - Installment and balloon schedule solver
//! - `price_begin` - Annuity-due amortization tables
//! - `simulation` - Request resolution and result caching

pub mod calendar;
pub mod present_value;
pub mod price_begin;
pub mod rates;
pub mod schedule;
pub mod simulation;
