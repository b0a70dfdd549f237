//! Application builder: wires router, middleware, and state into an Axum app.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use studio_core::config::AppConfig;
use studio_core::error::AppError;
use studio_core::traits::SystemClock;
use studio_database::{DatabasePool, Stores};
use studio_service::LogNotifier;
use studio_worker::CronScheduler;
use studio_worker::jobs::default_executor;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the server over already-opened `stores` until Ctrl+C or SIGTERM.
pub async fn run_server(
    config: AppConfig,
    stores: Stores,
    database: Option<DatabasePool>,
) -> Result<(), AppError> {
    tracing::info!("Starting studio booking server...");

    // ── Step 1: Services ─────────────────────────────────────────
    let state = AppState::build(
        config.clone(),
        stores,
        database.clone(),
        Arc::new(SystemClock),
        Arc::new(LogNotifier),
    )?;

    // ── Step 2: Bootstrap administrator ──────────────────────────
    match (
        config.auth.bootstrap_admin_email.as_deref(),
        config.auth.bootstrap_admin_password.as_deref(),
    ) {
        (Some(email), Some(password)) => {
            let created = state.accounts.ensure_admin(email, password).await?;
            tracing::info!(email, created, "Bootstrap administrator ensured");
        }
        (None, None) => {}
        _ => tracing::warn!(
            "Bootstrap admin needs both auth.bootstrap_admin_email and auth.bootstrap_admin_password; skipping"
        ),
    }

    // ── Step 3: Scheduled maintenance ────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let executor = Arc::new(default_executor(state.maintenance.as_ref().clone()));
        let scheduler = CronScheduler::new(executor).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Scheduled maintenance disabled");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Studio booking server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    })
    .into_future();

    // In-flight requests get `shutdown_grace_seconds` to finish after the signal.
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let drain_deadline = async move {
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = drain_deadline => {
            tracing::warn!(
                grace_seconds = config.server.shutdown_grace_seconds,
                "Grace period elapsed with requests still in flight"
            );
        }
    }

    // ── Step 5: Teardown ─────────────────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    if let Some(pool) = database {
        pool.close().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
