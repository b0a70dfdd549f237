//! Public notice handler.

use axum::Json;
use axum::extract::State;

use studio_core::error::AppError;
use studio_entity::notice::InfoNotice;

use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/notices/latest
///
/// `data` is `null` when nothing has been published.
pub async fn latest_notice(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Option<InfoNotice>>>, AppError> {
    let notice = state.notices.latest().await?;
    Ok(Json(ApiResponse::ok(notice)))
}
