//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GutendexCatalogAdapter, LocalFileStore, MemoryDbAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use bookshelf_core::ports::DatabaseService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Store & Run Migrations ---
    let db: Arc<dyn DatabaseService> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store. Data will not survive a restart.");
            Arc::new(MemoryDbAdapter::new())
        }
    };

    // --- 3. Initialize Service Adapters ---
    let files = Arc::new(LocalFileStore::new(&config.upload_dir).await?);
    info!("Storing uploads in {}", files.root().display());

    let catalog = Arc::new(
        GutendexCatalogAdapter::new(config.catalog_url.clone(), config.catalog_timeout)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(config.clone(), db, files, catalog));
    let app = build_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
