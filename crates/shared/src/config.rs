//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::DayCountConvention;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Simulation engine configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Simulation engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Day-count convention applied to every schedule run.
    #[serde(default)]
    pub day_count: DayCountConvention,
    /// Monthly-only plans with at most this many installments are interest-free.
    #[serde(default = "default_promotional_max_installments")]
    pub promotional_max_installments: u32,
    /// Upper bound on Price-Begin installment counts.
    #[serde(default = "default_max_price_begin_installments")]
    pub max_price_begin_installments: u32,
    /// Upper bound on schedule payment counts.
    #[serde(default = "default_max_schedule_payments")]
    pub max_schedule_payments: u32,
    /// Maximum number of cached simulation results.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Time-to-live of cached simulation results, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Allowed gap between total present value and financed principal.
    #[serde(default = "default_consistency_tolerance")]
    pub consistency_tolerance: Decimal,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            day_count: DayCountConvention::default(),
            promotional_max_installments: default_promotional_max_installments(),
            max_price_begin_installments: default_max_price_begin_installments(),
            max_schedule_payments: default_max_schedule_payments(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            consistency_tolerance: default_consistency_tolerance(),
        }
    }
}

fn default_promotional_max_installments() -> u32 {
    36
}

fn default_max_price_begin_installments() -> u32 {
    180
}

fn default_max_schedule_payments() -> u32 {
    420
}

fn default_cache_capacity() -> u64 {
    100
}

fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_consistency_tolerance() -> Decimal {
    Decimal::ONE
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("PARCELA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
