//! Recoverable turn handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use studio_core::error::AppError;
use studio_core::types::TurnId;
use studio_entity::turn::{RecoverableTurn, RedeemedTurn};

use crate::dto::request::{RedeemTurnRequest, RedeemedRangeQuery, SlotRequest};
use crate::dto::response::ApiResponse;
use crate::extractors::path::parse_id;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/turns
pub async fn save_turn(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecoverableTurn>>), AppError> {
    let turn = state.turns.save(&auth, req.slot).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(turn))))
}

/// GET /api/turns
pub async fn list_pending(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<RecoverableTurn>>>, AppError> {
    let turns = state.turns.list_pending(&auth).await?;
    Ok(Json(ApiResponse::ok(turns)))
}

/// POST /api/turns/{id}/redeem
pub async fn redeem_turn(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<RedeemTurnRequest>,
) -> Result<Json<ApiResponse<RecoverableTurn>>, AppError> {
    let id: TurnId = parse_id(&id)?;
    let turn = state
        .turns
        .redeem(&auth, id, req.slot, req.next_week)
        .await?;
    Ok(Json(ApiResponse::ok(turn)))
}

/// POST /api/turns/{id}/revert
pub async fn revert_turn(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RecoverableTurn>>, AppError> {
    let id: TurnId = parse_id(&id)?;
    let turn = state.turns.revert(&auth, id).await?;
    Ok(Json(ApiResponse::ok(turn)))
}

/// GET /api/turns/redeemed?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn list_redeemed(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(range): Query<RedeemedRangeQuery>,
) -> Result<Json<ApiResponse<Vec<RedeemedTurn>>>, AppError> {
    let turns = state
        .turns
        .list_redeemed_between(range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::ok(turns)))
}
