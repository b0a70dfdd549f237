//! Route definitions for the studio booking HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
///
/// Middleware is layered on by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(schedule_routes())
        .merge(holiday_routes())
        .merge(turn_routes())
        .merge(notice_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Registration, login, tokens, password reset
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/auth/reset-password/{token}",
            post(handlers::auth::reset_password),
        )
}

/// The caller's own schedule and the studio-wide occupancy view
fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/schedule/me",
            get(handlers::schedule::get_my_slots).put(handlers::schedule::set_slots),
        )
        .route(
            "/schedule/me/cancel",
            post(handlers::schedule::cancel_slot_this_week),
        )
        .route(
            "/schedule/me/reset",
            post(handlers::schedule::reset_to_original),
        )
        .route("/schedule/slots", get(handlers::schedule::list_slots))
}

/// Holiday registry
fn holiday_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/holidays",
            get(handlers::holiday::list_holidays).post(handlers::holiday::mark_holiday),
        )
        .route("/holidays/{date}", delete(handlers::holiday::remove_holiday))
}

/// Recoverable turns
fn turn_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/turns",
            get(handlers::turn::list_pending).post(handlers::turn::save_turn),
        )
        .route("/turns/redeemed", get(handlers::turn::list_redeemed))
        .route("/turns/{id}/redeem", post(handlers::turn::redeem_turn))
        .route("/turns/{id}/revert", post(handlers::turn::revert_turn))
}

/// Public notice
fn notice_routes() -> Router<AppState> {
    Router::new().route("/notices/latest", get(handlers::notice::latest_notice))
}

/// Admin endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::users::list_users))
        .route(
            "/admin/users/{id}",
            get(handlers::admin::users::get_user)
                .put(handlers::admin::users::edit_user)
                .delete(handlers::admin::users::delete_user),
        )
        .route(
            "/admin/users/{id}/payment",
            patch(handlers::admin::users::update_payment),
        )
        .route(
            "/admin/users/{id}/schedule/move",
            post(handlers::admin::schedule::move_user),
        )
        .route(
            "/admin/users/{id}/schedule/reset",
            post(handlers::admin::schedule::reset_user),
        )
        .route(
            "/admin/users/{id}/schedule/cancel",
            post(handlers::admin::schedule::cancel_user_slot),
        )
        .route(
            "/admin/turns/purge",
            post(handlers::admin::turns::purge_redeemed),
        )
        .route(
            "/admin/turns/{id}/redemption",
            delete(handlers::admin::turns::remove_redemption),
        )
        .route(
            "/admin/notices",
            post(handlers::admin::notices::publish).delete(handlers::admin::notices::clear),
        )
        .route(
            "/admin/maintenance/monthly-reset",
            post(handlers::admin::maintenance::monthly_reset),
        )
        .route(
            "/admin/maintenance/weekly-reset",
            post(handlers::admin::maintenance::weekly_reset),
        )
}

/// Liveness and database reachability
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

