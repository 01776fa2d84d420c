//! Quill API Server
//!
//! Main entry point for the Quill backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quill_api::{AppState, create_router};
use quill_core::post::PostService;
use quill_core::storage::{StorageConfig, StorageService};
use quill_db::{PostRepository, connect};
use quill_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Create object storage
    let storage_config = StorageConfig::try_from(&config.storage)?;
    let max_image_bytes = storage_config.max_file_size;
    let storage = StorageService::from_config(storage_config)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Object storage configured"
    );

    // Create post service
    let url_ttl = storage.download_ttl();
    let posts = PostService::new(Arc::new(PostRepository::new(db)), Arc::new(storage))
        .with_url_ttl(url_ttl);

    // Create router
    let app = create_router(AppState::new(posts, max_image_bytes));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
