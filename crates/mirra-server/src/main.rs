use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mirra_client::ReqwestFetcher;
use mirra_core::ProfileService;
use mirra_server::config::ServerConfig;
use mirra_server::routes;
use mirra_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mirra=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    let addr = format!("0.0.0.0:{}", config.port);

    let fetcher = ReqwestFetcher::with_timeout(config.scrape.retry.attempt_timeout())
        .context("Failed to create HTTP client")?;
    let cors = config.cors_layer()?;
    tracing::info!(
        endpoints = config.scrape.endpoints.len(),
        origins = ?config.cors_origins,
        "Loaded configuration"
    );

    let service = ProfileService::new(fetcher, config.scrape)?;
    let state = Arc::new(AppState { service });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
