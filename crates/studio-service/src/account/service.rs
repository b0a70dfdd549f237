//! Registration, login, token refresh, and password recovery.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use studio_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, ResetToken, TokenPair};
use studio_core::config::{AuthConfig, BookingConfig};
use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_database::UserStore;
use studio_entity::user::{CreateUser, UpdateUser, User, UserRole};

use super::profile;
use crate::context::RequestContext;
use crate::notify::{Notification, NotificationKind, Notifier};

/// Self-registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMember {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub weekly_quota: i16,
    pub password: String,
    pub password_confirmation: String,
}

/// A user together with freshly issued tokens.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    reset_ttl: Duration,
    public_url: String,
    booking: BookingConfig,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        auth: &AuthConfig,
        booking: BookingConfig,
    ) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(auth),
            encoder,
            decoder,
            notifier,
            clock,
            reset_ttl: Duration::minutes(auth.reset_token_ttl_minutes as i64),
            public_url: auth.public_url.trim_end_matches('/').to_string(),
            booking,
        }
    }

    /// Create a member account and sign them in.
    pub async fn register(&self, form: RegisterMember) -> AppResult<AuthSession> {
        let name = profile::require_name("Name", &form.name)?;
        let surname = profile::require_name("Surname", &form.surname)?;
        let email = profile::normalize_email(&form.email)?;
        let phone = profile::normalize_phone(&form.phone)?;
        profile::check_weekly_quota(form.weekly_quota, &self.booking)?;
        self.validator
            .validate(&form.password, &form.password_confirmation)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let user = self
            .users
            .create(
                CreateUser {
                    name,
                    surname,
                    email,
                    phone,
                    weekly_quota: form.weekly_quota,
                    password_hash: self.hasher.hash_password(&form.password)?,
                    role: UserRole::User,
                },
                self.clock.now(),
            )
            .await?;
        info!(user_id = %user.id, weekly_quota = user.weekly_quota, "Member registered");

        self.notify(Notification {
            kind: NotificationKind::Welcome,
            to: user.email.clone(),
            subject: "Registration successful".to_string(),
            body: format!("Hi {}, your studio account is ready.", user.name),
        })
        .await;

        let tokens = self.issue_tokens(&user)?;
        Ok(AuthSession { user, tokens })
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let invalid = || AppError::unauthorized("Invalid email or password");

        let email = email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid());
        }

        info!(user_id = %user.id, "User logged in");
        let tokens = self.issue_tokens(&user)?;
        Ok(AuthSession { user, tokens })
    }

    /// Exchange a refresh token for a new pair. The role is re-read from
    /// the store.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;
        self.issue_tokens(&user)
    }

    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Store a reset token for `email` and send the member a reset link.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("No account is registered with that email"))?;

        let token = ResetToken::generate();
        let expires_at = self.clock.now() + self.reset_ttl;
        self.users
            .set_reset_token(user.id, &token.hash, expires_at)
            .await?;
        info!(user_id = %user.id, expires_at = %expires_at, "Password reset requested");

        self.notify(Notification {
            kind: NotificationKind::PasswordReset,
            to: user.email.clone(),
            subject: "Password recovery".to_string(),
            body: format!(
                "Use this link to choose a new password: {}/reset-password/{}",
                self.public_url, token.plaintext
            ),
        })
        .await;
        Ok(())
    }

    /// Set a new password using a token from [`Self::forgot_password`].
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        self.validator.validate(password, confirmation)?;

        let invalid = || AppError::validation("The reset link is invalid or has expired");
        let digest = ResetToken::digest(token);
        let user = self
            .users
            .find_by_reset_token(&digest)
            .await?
            .ok_or_else(invalid)?;
        let now = self.clock.now();
        if !user.reset_token_matches(&digest, now) {
            return Err(invalid());
        }

        let hash = self.hasher.hash_password(password)?;
        self.users.update_password(user.id, &hash, now).await?;
        info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Make sure an administrator with `email` exists, creating or promoting
    /// it. Returns `true` when an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<bool> {
        let email = profile::normalize_email(email)?;
        let now = self.clock.now();

        if let Some(existing) = self.users.find_by_email(&email).await? {
            if !existing.is_admin() {
                let promote = UpdateUser {
                    role: Some(UserRole::Admin),
                    ..UpdateUser::default()
                };
                self.users.update(existing.id, promote, now).await?;
                info!(user_id = %existing.id, "Existing account promoted to administrator");
            }
            return Ok(false);
        }

        let admin = self
            .users
            .create(
                CreateUser {
                    name: "Studio".to_string(),
                    surname: "Admin".to_string(),
                    email,
                    phone: "000000".to_string(),
                    weekly_quota: self.booking.min_weekly_quota,
                    password_hash: self.hasher.hash_password(password)?,
                    role: UserRole::Admin,
                },
                now,
            )
            .await?;
        info!(user_id = %admin.id, "Bootstrap administrator created");
        Ok(true)
    }

    fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        self.encoder
            .generate_token_pair(user.id, user.role, &user.email)
    }

    async fn notify(&self, notification: Notification) {
        let kind = notification.kind;
        if let Err(e) = self.notifier.send(notification).await {
            warn!(kind = kind.as_str(), error = %e, "Failed to send notification");
        }
    }
}
