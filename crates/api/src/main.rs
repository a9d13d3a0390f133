//! CryptoRisk API server binary entrypoint.

use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cryptorisk_common::config::AppConfig;

use cryptorisk_api::routes::create_router;
use cryptorisk_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("cryptorisk_api=debug,cryptorisk_engine=info,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting CryptoRisk API server...");

    let config = AppConfig::from_env()?;
    let port = config.api_port;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        rolling_window = config.risk.rolling_window,
        "Configuration loaded"
    );

    let state = AppState::new(config)?;

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
