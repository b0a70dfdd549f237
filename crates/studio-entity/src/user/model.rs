//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::UserId;

use super::role::UserRole;

/// A registered member or administrator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login email, stored lowercased.
    pub email: String,
    /// Contact phone number, digits only.
    pub phone: String,
    /// Number of classes per week the member pays for (1 to 3).
    pub weekly_quota: i16,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether this month's fee has been paid.
    pub paid: bool,
    /// When the fee was last marked as paid.
    pub paid_at: Option<DateTime<Utc>>,
    /// Account role.
    pub role: UserRole,
    /// SHA-256 of the outstanding password-reset token.
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    /// Expiry of the outstanding password-reset token.
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// "Name Surname", as shown on admin listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Apply an admin edit in place. Returns `true` when the weekly quota
    /// changed, which invalidates the member's ledger.
    pub fn apply_update(&mut self, changes: UpdateUser, now: DateTime<Utc>) -> bool {
        let quota_changed = changes
            .weekly_quota
            .is_some_and(|quota| quota != self.weekly_quota);

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(surname) = changes.surname {
            self.surname = surname;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(phone) = changes.phone {
            self.phone = phone;
        }
        if let Some(quota) = changes.weekly_quota {
            self.weekly_quota = quota;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(paid) = changes.paid {
            self.set_paid(paid, now);
        }
        self.updated_at = now;
        quota_changed
    }

    /// Set the payment flag, stamping `paid_at` on the unpaid-to-paid edge.
    pub fn set_paid(&mut self, paid: bool, now: DateTime<Utc>) {
        if paid && !self.paid {
            self.paid_at = Some(now);
        } else if !paid {
            self.paid_at = None;
        }
        self.paid = paid;
        self.updated_at = now;
    }

    /// Whether `token_hash` matches an unexpired reset token.
    pub fn reset_token_matches(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(stored), Some(expires)) => stored == token_hash && now < expires,
            _ => false,
        }
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub weekly_quota: i16,
    /// Pre-hashed password.
    pub password_hash: String,
    pub role: UserRole,
}

/// Admin edit of a user's profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub weekly_quota: Option<i16>,
    pub role: Option<UserRole>,
    pub paid: Option<bool>,
}

impl UpdateUser {
    /// Whether the edit carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.weekly_quota.is_none()
            && self.role.is_none()
            && self.paid.is_none()
    }
}

/// Minimal identity attached to listings that mention a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub surname: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            surname: user.surname.clone(),
        }
    }
}
