//! Admin recoverable-turn handlers.

use axum::Json;
use axum::extract::{Path, State};

use studio_core::error::AppError;
use studio_core::types::TurnId;
use studio_entity::turn::RecoverableTurn;

use crate::dto::response::{ApiResponse, CountResponse};
use crate::extractors::AdminUser;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// POST /api/admin/turns/purge
pub async fn purge_redeemed(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<CountResponse>>, AppError> {
    let count = state.turns.purge_redeemed(&admin).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// DELETE /api/admin/turns/{id}/redemption
pub async fn remove_redemption(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RecoverableTurn>>, AppError> {
    let id: TurnId = parse_id(&id)?;
    let turn = state.turns.admin_revert(&admin, id).await?;
    Ok(Json(ApiResponse::ok(turn)))
}
