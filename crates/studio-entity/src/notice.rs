//! Informational notices shown to members on login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::NoticeId;

/// An announcement published by the studio. Only the newest is displayed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InfoNotice {
    pub id: NoticeId,
    pub title: String,
    pub description: String,
    /// Optional link for more details.
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to publish a notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotice {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}
