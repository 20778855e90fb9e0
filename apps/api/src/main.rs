use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assist_api::config::Config;
use assist_api::routes::build_router;
use assist_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; bad PORT / MAX_UPLOAD_MB values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assist-api v{}", env!("CARGO_PKG_VERSION"));

    if config.openrouter_api_key.is_some() {
        info!("OpenRouter key configured (base URL: {})", config.openrouter_base_url);
    } else {
        warn!(
            "No OpenRouter key found in the environment or {}; job analysis is disabled and \
             vehicle analysis will use heuristic fallbacks",
            config.secrets_file.display()
        );
    }
    info!(
        "Vision model: {}, upload limit: {} bytes",
        config.vision_model, config.max_upload_bytes
    );

    let state = AppState::new(config.clone());
    info!("Shop registry seeded with {} shops", state.registry.count().await);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
