//! Port abstraction for outbound user notifications.
use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Delivery failures.
    pub enum NotificationError {
        /// The message could not be built for this recipient.
        InvalidMessage { message: String } => "notification could not be built: {message}",
        /// The transport refused or failed to deliver.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// Password-reset email content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetNotice {
    /// Account email.
    pub recipient: EmailAddress,
    /// Greeting name.
    pub name: String,
    /// Link containing the raw reset token.
    pub reset_url: String,
}

/// Delivers notifications to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send the password-reset link.
    async fn send_password_reset(
        &self,
        notice: &PasswordResetNotice,
    ) -> Result<(), NotificationError>;
}
