//! Admin schedule overrides. These bypass slot capacity.

use axum::Json;
use axum::extract::{Path, State};

use studio_core::error::AppError;
use studio_core::types::UserId;
use studio_service::MySchedule;

use crate::dto::request::{MoveUserRequest, SlotRequest};
use crate::dto::response::ApiResponse;
use crate::extractors::path::parse_id;
use crate::extractors::{AdminUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/admin/users/{id}/schedule/move
pub async fn move_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<MoveUserRequest>,
) -> Result<Json<ApiResponse<MySchedule>>, AppError> {
    let id: UserId = parse_id(&id)?;
    let schedule = state
        .admin_booking
        .move_user(&admin, id, req.current_slot, req.new_slot)
        .await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

/// POST /api/admin/users/{id}/schedule/reset
pub async fn reset_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MySchedule>>, AppError> {
    let id: UserId = parse_id(&id)?;
    let schedule = state.admin_booking.reset_to_originals(&admin, id).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

/// POST /api/admin/users/{id}/schedule/cancel
pub async fn cancel_user_slot(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SlotRequest>,
) -> Result<Json<ApiResponse<MySchedule>>, AppError> {
    let id: UserId = parse_id(&id)?;
    let schedule = state
        .admin_booking
        .cancel_user_slot(&admin, id, req.slot)
        .await?;
    Ok(Json(ApiResponse::ok(schedule)))
}
