//! Admin notice handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use studio_core::error::AppError;
use studio_entity::notice::InfoNotice;

use crate::dto::request::PublishNoticeRequest;
use crate::dto::response::{ApiResponse, CountResponse};
use crate::extractors::{AdminUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/admin/notices
pub async fn publish(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(req): ValidatedJson<PublishNoticeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InfoNotice>>), AppError> {
    let notice = state.notices.publish(&admin, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notice))))
}

/// DELETE /api/admin/notices
pub async fn clear(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<CountResponse>>, AppError> {
    let count = state.notices.clear(&admin).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}
