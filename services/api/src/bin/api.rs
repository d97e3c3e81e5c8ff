//! services/api/src/bin/api.rs

use guessing_api::{
    adapters::{spawn_session_reaper, DbAdapter, MemoryStore},
    config::{Config, SessionBackend},
    error::ApiError,
    web::{router, state::AppState},
};
use guessing_game_core::ports::{RandomSecret, SessionStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired sessions are swept from the session store.
const REAP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    // Any failure here stops startup: the service never serves traffic
    // without a working score store.
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool, config.session_ttl));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Pick the Session Store ---
    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Postgres => db_adapter.clone(),
        SessionBackend::Memory => Arc::new(MemoryStore::new(config.session_ttl)),
    };
    info!("Session store: {:?}", config.session_backend);
    spawn_session_reaper(sessions.clone(), REAP_INTERVAL);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        sessions,
        db_adapter,
        Arc::new(RandomSecret),
    )?);

    // --- 5. Create the Web Router ---
    let app = router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on http://{}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
