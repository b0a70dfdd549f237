//! Studio booking server
//!
//! Main entry point: loads configuration, initialises logging, opens the
//! configured store, and hands over to the HTTP server.

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use studio_core::config::{AppConfig, DatabaseBackend};
use studio_core::error::AppError;
use studio_database::migration::run_migrations;
use studio_database::{DatabasePool, Stores};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `STUDIO_ENV` overlay, then `STUDIO__*`
/// environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("STUDIO_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging. `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Open the configured backend and run the server until shutdown.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting studio booking server v{}", env!("CARGO_PKG_VERSION"));

    let (stores, database) = match config.database.backend {
        DatabaseBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;
            (pool.stores(), Some(pool))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using the in-memory store; all data is lost on restart");
            (Stores::memory(), None)
        }
    };

    studio_api::run_server(config, stores, database).await
}
