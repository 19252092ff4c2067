//! Parcela API Server
//!
//! Main entry point for the financing simulator service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parcela_api::{AppState, create_router};
use parcela_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parcela=debug,parcela_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    info!(
        day_count = %config.simulation.day_count,
        promotional_max_installments = config.simulation.promotional_max_installments,
        cache_capacity = config.simulation.cache_capacity,
        cache_ttl_secs = config.simulation.cache_ttl_secs,
        "Simulation engine configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(AppState::from_config(config));

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
