mod auth;
mod config;
mod error;
mod handlers;
mod metadata;
mod models;
mod render;
mod storage;
mod upload;

#[cfg(test)]
mod testing;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use config::Config;
use handlers::AppState;
use metadata::PgMetadataStore;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::create_storage;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "screenshot_host=debug,tower_http=debug,axum=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting screenshot host");
    tracing::info!("Metadata table: {}", config.table_name);

    // Connect to database
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(config.database.clone())
        .await?;
    tracing::info!("Connected to database");

    sqlx::query("SELECT 1")
        .execute(&db)
        .await
        .map_err(|e| anyhow::anyhow!("Database connection test failed: {}", e))?;

    tracing::info!("Database connection verified");

    // The table itself is created lazily by the first upload
    let metadata = Arc::new(PgMetadataStore::new(db, config.table_name.clone()));
    let files = create_storage(&config);

    let state = AppState {
        metadata,
        files,
        config: config.clone(),
    };

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route(
            "/upload",
            post(handlers::upload_screenshot).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/ss/all", get(handlers::list_screenshots))
        .route(
            "/ss/api",
            post(handlers::rename_screenshot).delete(handlers::delete_screenshot),
        )
        .route("/ss/:slug", get(handlers::show_screenshot))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
