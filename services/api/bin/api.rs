//! Main Entrypoint for the Switchboard API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the provider registry and checking the configured provider exists.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use switchboard_api::{
    config::Config, router::create_router, state::AppState, ws::provider::builtin_registry,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Resolve the Provider ---
    let registry = builtin_registry();
    if !registry.contains(&config.provider) {
        anyhow::bail!(
            "Unknown provider: {}. Available: {}",
            config.provider,
            registry.names().collect::<Vec<_>>().join(", ")
        );
    }

    if config.twilio_auth_token.is_none() {
        warn!("TWILIO_AUTH_TOKEN is not set; incoming-call webhooks are not signature-checked");
    }

    let app_state = Arc::new(AppState::new(config.clone(), registry));

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = %config.provider,
        model = %config.model,
        voice = %config.voice,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
