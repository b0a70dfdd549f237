//! Outbound member notifications.
//!
//! Delivery is an external concern; the shipped [`LogNotifier`] emits one
//! structured log event per message so a log shipper or mail relay can pick
//! them up.

use std::fmt::Debug;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use studio_core::result::AppResult;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    PasswordReset,
    PaymentReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::PasswordReset => "password_reset",
            Self::PaymentReminder => "payment_reminder",
        }
    }
}

/// One message to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// The body as it may be written to logs. Reset links are credentials
    /// and never leave the message itself.
    pub fn loggable_body(&self) -> &str {
        match self.kind {
            NotificationKind::PasswordReset => "[redacted]",
            NotificationKind::Welcome | NotificationKind::PaymentReminder => &self.body,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync + Debug + 'static {
    async fn send(&self, notification: Notification) -> AppResult<()>;
}

/// Writes each notification as a structured `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> AppResult<()> {
        info!(
            kind = notification.kind.as_str(),
            to = %notification.to,
            subject = %notification.subject,
            body = %notification.loggable_body(),
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Keeps every notification in memory. Used by tests to assert on what
/// would have been sent.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> AppResult<()> {
        match self.sent.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
        Ok(())
    }
}
