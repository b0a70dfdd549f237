//! Manual triggers for the periodic resets.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use studio_core::error::AppError;

use crate::dto::response::ApiResponse;
use crate::extractors::AdminUser;
use crate::state::AppState;

/// POST /api/admin/maintenance/monthly-reset
pub async fn monthly_reset(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    tracing::info!(admin_id = %admin.user_id, "Monthly reset triggered manually");
    let summary = state.maintenance.apply_monthly_reset().await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// POST /api/admin/maintenance/weekly-reset
pub async fn weekly_reset(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    tracing::info!(admin_id = %admin.user_id, "Weekly reset triggered manually");
    let summary = state.maintenance.apply_weekly_reset().await?;
    Ok(Json(ApiResponse::ok(summary)))
}
