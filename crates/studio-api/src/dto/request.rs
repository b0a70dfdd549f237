//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use studio_entity::notice::CreateNotice;
use studio_entity::schedule::SlotSelection;
use studio_entity::user::{UpdateUser, UserRole};
use studio_service::RegisterMember;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Surname is required"))]
    pub surname: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 6, max = 32, message = "Phone is invalid"))]
    pub phone: String,
    /// Classes per week; bounds come from booking configuration.
    pub weekly_quota: i16,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub password_confirmation: String,
}

impl From<RegisterRequest> for RegisterMember {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            email: req.email,
            phone: req.phone,
            weekly_quota: req.weekly_quota,
            password: req.password,
            password_confirmation: req.password_confirmation,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Forgotten password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
}

/// New password, submitted with the token from the reset link.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub password_confirmation: String,
}

/// Full slot set for the current member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetSlotsRequest {
    #[validate(length(min = 1, max = 7, message = "Select between one and seven slots"))]
    pub slots: Vec<SlotSelection>,
}

/// A single slot, e.g. `{"day": "monday", "hour": "08:00"}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SlotRequest {
    #[serde(flatten)]
    pub slot: SlotSelection,
}

/// Redeem a recoverable turn into `slot`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RedeemTurnRequest {
    #[serde(flatten)]
    pub slot: SlotSelection,
    /// Book the occurrence after the next one.
    #[serde(default)]
    pub next_week: bool,
}

/// Date range for redeemed-turn listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RedeemedRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Holiday to mark.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkHolidayRequest {
    pub date: NaiveDate,
    #[validate(length(max = 200, message = "Description is too long"))]
    pub description: Option<String>,
}

/// Admin move of one permanent slot.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveUserRequest {
    pub current_slot: SlotSelection,
    pub new_slot: SlotSelection,
}

/// Admin edit of a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub surname: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
    pub weekly_quota: Option<i16>,
    pub role: Option<UserRole>,
    pub paid: Option<bool>,
}

impl From<EditUserRequest> for UpdateUser {
    fn from(req: EditUserRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            email: req.email,
            phone: req.phone,
            weekly_quota: req.weekly_quota,
            role: req.role,
            paid: req.paid,
        }
    }
}

/// Payment flag update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct PaymentRequest {
    pub paid: bool,
}

/// Notice to publish.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PublishNoticeRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,
    #[validate(url(message = "Link must be a URL"))]
    pub link: Option<String>,
}

impl From<PublishNoticeRequest> for CreateNotice {
    fn from(req: PublishNoticeRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            link: req.link,
        }
    }
}
