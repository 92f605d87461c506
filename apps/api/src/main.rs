//! # BiasharaTrack API
//!
//! HTTP server for sales, receipts, inventory alerts and customer credit.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Server                                     │
//! │                                                                         │
//! │  Dashboard / POS ───► HTTP (8080) ───► routes ───► SQLite (WAL)        │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                    bearer JWT check                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use biashara_api::config::ApiConfig;
use biashara_api::{build_app, AppState};
use biashara_core::catalog::StaticCatalog;
use biashara_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting BiasharaTrack API server...");

    // Load configuration
    let config = ApiConfig::load().context("Invalid configuration")?;
    let sale_timeout_ms = config.sale_timeout.as_millis() as u64;
    info!(
        port = config.http_port,
        database = %config.database_path.display(),
        sale_timeout_ms,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development secret");
    }

    // Connect to database (runs migrations)
    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let state = AppState::new(
        db.clone(),
        config.settlement_config(),
        &config.jwt_secret,
        Arc::new(StaticCatalog::with_samples()),
    );
    let mut app = build_app(state);
    if let Some(cors) = config.cors_layer() {
        info!(origin = ?config.cors_allowed_origin, "CORS enabled");
        app = app.layer(cors);
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
