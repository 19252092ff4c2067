//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for schedule and Price-Begin simulations
//! - Request parsing and response types
//! - Error-to-status mapping

pub mod routes;

use axum::Router;
use parcela_core::simulation::SimulationCache;
use parcela_shared::AppConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached simulation runner.
    pub simulations: SimulationCache,
    /// Loaded application configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Builds state from configuration.
    #[must_use]
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            simulations: SimulationCache::from_config(&config.simulation),
            config: Arc::new(config),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
