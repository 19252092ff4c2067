//! Shared types, errors, and configuration for Parcela.
//!
//! This crate provides common types used across all other crates:
//! - Money rounding helpers with decimal precision
//! - Day/month/year date formatting
//! - Day-count conventions
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ServerConfig, SimulationConfig};
pub use error::{AppError, AppResult};
