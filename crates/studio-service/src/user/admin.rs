//! Admin user management: listing, profile edits, payment flag, deletion.

use std::sync::Arc;

use tracing::info;

use studio_core::config::BookingConfig;
use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_core::types::{PageRequest, PageResponse, UserId};
use studio_database::UserStore;
use studio_entity::user::{UpdateUser, User};

use crate::account::profile;
use crate::context::RequestContext;

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    booking: BookingConfig,
}

impl AdminUserService {
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>, booking: BookingConfig) -> Self {
        Self {
            users,
            clock,
            booking,
        }
    }

    /// Lists all users with pagination.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        ctx.require_admin()?;
        self.users.list(page.normalized()).await
    }

    /// Gets a single user by ID.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: UserId) -> AppResult<User> {
        ctx.require_admin()?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Edit a user's profile. Changing the weekly quota drops the member's
    /// schedule so their next submission is a first assignment.
    pub async fn edit_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        changes: UpdateUser,
    ) -> AppResult<User> {
        ctx.require_admin()?;
        if changes.is_empty() {
            return Err(AppError::validation("No changes were provided"));
        }
        if user_id == ctx.user_id && changes.role.is_some_and(|role| !role.is_admin()) {
            return Err(AppError::validation(
                "Administrators cannot remove their own admin role",
            ));
        }

        let changes = UpdateUser {
            name: changes
                .name
                .map(|n| profile::require_name("Name", &n))
                .transpose()?,
            surname: changes
                .surname
                .map(|s| profile::require_name("Surname", &s))
                .transpose()?,
            email: changes
                .email
                .map(|e| profile::normalize_email(&e))
                .transpose()?,
            phone: changes
                .phone
                .map(|p| profile::normalize_phone(&p))
                .transpose()?,
            weekly_quota: changes
                .weekly_quota
                .map(|q| profile::check_weekly_quota(q, &self.booking).map(|()| q))
                .transpose()?,
            role: changes.role,
            paid: changes.paid,
        };

        let before = self.get_user(ctx, user_id).await?;
        let updated = self
            .users
            .update(user_id, changes, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(
            admin_id = %ctx.user_id,
            user_id = %user_id,
            quota_changed = before.weekly_quota != updated.weekly_quota,
            "User updated"
        );
        Ok(updated)
    }

    /// Delete a user together with their schedule and turns.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: UserId) -> AppResult<()> {
        ctx.require_admin()?;
        if user_id == ctx.user_id {
            return Err(AppError::validation("Administrators cannot delete themselves"));
        }
        if !self.users.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!(admin_id = %ctx.user_id, user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Mark this month's fee as paid or unpaid.
    pub async fn update_payment(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        paid: bool,
    ) -> AppResult<User> {
        ctx.require_admin()?;
        let user = self
            .users
            .set_paid(user_id, paid, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        info!(admin_id = %ctx.user_id, user_id = %user_id, paid, "Payment flag updated");
        Ok(user)
    }
}
