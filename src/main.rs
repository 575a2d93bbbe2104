use std::sync::Arc;

use recommendations_api::{
    config::{Config, StorageBackend},
    db::{self, MemoryRecommendationStore, PgRecommendationStore, RecommendationStore},
    routes::{create_router, AppState},
};
use tracing_subscriber::EnvFilter;

/// Exit status telling a process supervisor not to respawn the service
const EXIT_SCHEMA_INIT_FAILED: i32 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(storage = ?config.storage, "Starting recommendation service");

    let store: Arc<dyn RecommendationStore> = match config.storage {
        StorageBackend::Postgres => {
            let pool = match connect_and_init(&config).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!(error = %e, "Cannot initialize database: cannot continue");
                    std::process::exit(EXIT_SCHEMA_INIT_FAILED);
                }
            };
            Arc::new(PgRecommendationStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Arc::new(MemoryRecommendationStore::new())
        }
    };

    let app = create_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Service initialized");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_and_init(config: &Config) -> anyhow::Result<sqlx::PgPool> {
    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::init_schema(&pool).await?;
    Ok(pool)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
