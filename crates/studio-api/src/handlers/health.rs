//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Answers 503 when the database does not respond.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, database) = match &state.database {
        None => (StatusCode::OK, "memory".to_string()),
        Some(pool) => match pool.ping().await {
            Ok(()) => (StatusCode::OK, "connected".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Health check: database unreachable");
                (StatusCode::SERVICE_UNAVAILABLE, "unreachable".to_string())
            }
        },
    };

    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    };
    (status, Json(ApiResponse::ok(body)))
}
