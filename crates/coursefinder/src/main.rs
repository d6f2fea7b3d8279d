use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use coursefinder::config::ServerConfig;
use coursefinder::db::CourseDbManager;
use coursefinder::server::create_router;
use coursefinder::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .init();

    info!("Starting course finder");

    let db = CourseDbManager::new(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    info!("Database opened at {} ({} courses)", config.db_path, db.course_count()?);

    let state = Arc::new(AppState::new(db, config.page_size));
    let app = create_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
