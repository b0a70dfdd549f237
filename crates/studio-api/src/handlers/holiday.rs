//! Holiday handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use studio_core::error::AppError;
use studio_entity::holiday::Holiday;

use crate::dto::request::MarkHolidayRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::path::parse_date;
use crate::extractors::{AdminUser, AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/holidays
pub async fn list_holidays(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Holiday>>>, AppError> {
    let holidays = state.holidays.list().await?;
    Ok(Json(ApiResponse::ok(holidays)))
}

/// POST /api/holidays
pub async fn mark_holiday(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(req): ValidatedJson<MarkHolidayRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Holiday>>), AppError> {
    let holiday = state.holidays.mark(&admin, req.date, req.description).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(holiday))))
}

/// DELETE /api/holidays/{date}
pub async fn remove_holiday(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(date): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let date = parse_date(&date)?;
    state.holidays.remove(&admin, date).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Holiday on {date} removed"
    )))))
}
