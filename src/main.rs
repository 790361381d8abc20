// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory-Map API Server
//!
//! Hosts headless map sessions that turn a user's activities into
//! territories and coordinate viewport focus and route reveals.

use std::sync::Arc;
use territory_map::{
    config::Config,
    services::{BackendSource, SessionRegistry},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Territory-Map API");

    // Activity backend client
    let source = BackendSource::new(&config.backend_url, &config.backend_api_key)?;
    tracing::info!(backend = %config.backend_url, "Activity backend configured");

    tracing::info!(
        padding = config.map.fit_padding_px,
        reveal_ms = config.map.reveal_duration.as_millis() as u64,
        reveal_steps = config.map.reveal_steps,
        seek_attempts = config.map.seek_attempts,
        "Map settings loaded"
    );

    // Build shared state
    let state = Arc::new(AppState {
        sessions: SessionRegistry::new(source, config.map),
        config: config.clone(),
    });

    // Build router
    let app = territory_map::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("territory_map=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
