// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in Tracker API Server
//!
//! Serves the OAuth login flow and session-gated routes of the check-in
//! tracker.

use checkin_tracker::{
    config::Config,
    db::Db,
    services::{ExpirySweeper, OAuthClient, TokenStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment; missing OAuth settings are fatal
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Check-in Tracker API");

    let oauth = OAuthClient::new(&config.oauth).expect("Invalid OAuth provider configuration");

    let db = Db::connect(&config.db_filename)
        .await
        .expect("Failed to open database");

    let tokens = TokenStore::new(db.clone());

    // Expired sessions are also removed lazily on use; this catches the rest
    let mut sweeper = ExpirySweeper::new(tokens.clone(), config.sweep_interval);
    sweeper.start()?;

    // Build shared state
    let state = Arc::new(AppState {
        db,
        oauth,
        tokens,
    });

    // Build router
    let app = checkin_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, shutting down background tasks");
    sweeper.stop().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
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
                .add_directive("checkin_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
