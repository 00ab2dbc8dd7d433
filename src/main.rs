//! Sportly Backend Service
//!
//! Main entry point for the Sportly pickup-sports backend.
//! This service provides:
//! - REST API for the mobile client
//! - Background sweeper applying time-due session transitions

use sportly_backend::config::AppConfig;
use sportly_backend::database::{create_pool, run_migrations};
use sportly_backend::error::{AppError, AppResult};
use sportly_backend::rest_api;
use sportly_backend::services::StatusSweeper;
use sportly_backend::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "sportly_backend={},sqlx=warn,tower_http=info",
                    config.log_level
                )
                .into()
            }),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Sportly Backend Service Starting               ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    let app_state = Arc::new(AppState::new(pool, config.auth.clone()));
    info!("✓ Application state initialized with repositories and services");

    let app = rest_api::build_router(app_state.clone());
    info!("✓ REST router initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    info!("Starting background tasks...");

    let sweeper = StatusSweeper::new(app_state.session_repo.clone())
        .with_sweep_interval(config.sweep_interval());

    let sweeper_handle = tokio::spawn(async move {
        sweeper.start().await;
    });
    info!(
        "✓ Status sweeper background task started ({}s interval)",
        config.sweep_interval_secs
    );

    // =========================================================================
    // START SERVER
    // =========================================================================
    let address = format!("0.0.0.0:{}", config.http_port);
    info!("Starting HTTP server on {}...", address);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Sportly Backend Service Ready!                 ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  REST API:     0.0.0.0:{}                              ║", config.http_port);
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()) => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = sweeper_handle => {
            error!("Status sweeper exited unexpectedly");
        }
    }

    info!("Sportly backend service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
