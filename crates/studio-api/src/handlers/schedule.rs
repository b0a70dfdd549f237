//! Member schedule handlers.

use axum::Json;
use axum::extract::State;

use studio_core::error::AppError;
use studio_entity::schedule::SlotOccupancy;
use studio_service::{MySchedule, SelectionResult};

use crate::dto::request::{SetSlotsRequest, SlotRequest};
use crate::dto::response::ApiResponse;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/schedule/me
pub async fn get_my_slots(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MySchedule>>, AppError> {
    let schedule = state.booking.get_my_slots(&auth).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

/// PUT /api/schedule/me
pub async fn set_slots(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SetSlotsRequest>,
) -> Result<Json<ApiResponse<SelectionResult>>, AppError> {
    let result = state.booking.apply_selection(&auth, req.slots).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/schedule/me/cancel
pub async fn cancel_slot_this_week(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SlotRequest>,
) -> Result<Json<ApiResponse<MySchedule>>, AppError> {
    let schedule = state.booking.remove_slot_this_week(&auth, req.slot).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

/// POST /api/schedule/me/reset
pub async fn reset_to_original(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MySchedule>>, AppError> {
    let schedule = state.booking.reset_to_original(&auth).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

/// GET /api/schedule/slots
pub async fn list_slots(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SlotOccupancy>>>, AppError> {
    let slots = state.booking.list_slots().await?;
    Ok(Json(ApiResponse::ok(slots)))
}
