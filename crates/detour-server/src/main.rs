//! Detour Server - obstacle-avoiding route planning over HTTP

use anyhow::Result;
use detour_server::{api, config::Config, state::AppState, tomtom::TomTomClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("detour_server=debug".parse()?))
        .init();

    tracing::info!("Starting Detour Server...");

    let config = Config::from_env();
    let port = config.server_port;
    if config.provider_api_key.is_none() {
        tracing::warn!("No routing provider API key set; planning requests will be rejected");
    }
    tracing::info!(
        "Provider {} (timeout {}s, max {} avoid areas)",
        config.provider_url,
        config.provider_timeout_s,
        config.max_avoid_areas
    );

    let provider = TomTomClient::from_config(&config)?;
    let state = Arc::new(AppState::new(config, provider));

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
