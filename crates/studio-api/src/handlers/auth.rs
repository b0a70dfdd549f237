//! Auth handlers: register, login, refresh, me, password reset.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use studio_auth::TokenPair;
use studio_core::error::AppError;
use studio_entity::user::User;
use studio_service::AuthSession;

use crate::dto::request::{
    ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), AppError> {
    let session = state.accounts.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let session = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = state.accounts.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.accounts.me(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.accounts.forgot_password(&req.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "A password reset link has been sent",
    ))))
}

/// POST /api/auth/reset-password/{token}
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state
        .accounts
        .reset_password(&token, &req.password, &req.password_confirmation)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password updated, you can now log in",
    ))))
}
