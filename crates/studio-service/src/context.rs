//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use studio_core::error::AppError;
use studio_core::types::UserId;
use studio_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Built by the HTTP layer after the bearer token is verified and the user
/// is reloaded from the store, so `role` reflects the current row rather
/// than the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's current role.
    pub role: UserRole,
    /// Login email, for log lines.
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole, email: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            email: email.into(),
            request_time: Utc::now(),
        }
    }

    /// Context for a loaded user.
    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.role, user.email.clone())
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fail with `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator role required"))
        }
    }
}
