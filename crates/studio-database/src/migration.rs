//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use studio_core::error::{AppError, ErrorKind};

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Schema migration failed: {e}"),
                e,
            )
        })?;

    info!("Schema is up to date");
    Ok(())
}
