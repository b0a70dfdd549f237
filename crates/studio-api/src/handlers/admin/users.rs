//! Admin user management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use studio_core::error::AppError;
use studio_core::types::{PageResponse, UserId};
use studio_entity::user::User;

use crate::dto::request::{EditUserRequest, PaymentRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::path::parse_id;
use crate::extractors::{AdminUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<User>>>, AppError> {
    let page = state
        .admin_users
        .list_users(&admin, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let id: UserId = parse_id(&id)?;
    let user = state.admin_users.get_user(&admin, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/{id}
pub async fn edit_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<EditUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let id: UserId = parse_id(&id)?;
    let user = state.admin_users.edit_user(&admin, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let id: UserId = parse_id(&id)?;
    state.admin_users.delete_user(&admin, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("User deleted"))))
}

/// PATCH /api/admin/users/{id}/payment
pub async fn update_payment(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PaymentRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let id: UserId = parse_id(&id)?;
    let user = state
        .admin_users
        .update_payment(&admin, id, req.paid)
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}
