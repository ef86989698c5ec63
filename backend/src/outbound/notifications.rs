//! Notification senders: SMTP delivery via `lettre`, and a tracing-only
//! sender for environments without a mail relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::domain::RESET_TOKEN_TTL_MINUTES;
use crate::domain::ports::{NotificationError, NotificationSender, PasswordResetNotice};

const RESET_SUBJECT: &str = "Reset your password";

/// Connection details for the SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Login; STARTTLS is used whenever credentials are set.
    pub username: Option<String>,
    /// Password for `username`.
    pub password: Option<String>,
    /// `From` address, optionally with a display name.
    pub sender: String,
}

/// [`NotificationSender`] delivering mail through an SMTP relay.
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotificationSender {
    /// Build a sender for the relay.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::InvalidMessage`] when the sender address
    /// does not parse and [`NotificationError::Delivery`] when the TLS relay
    /// cannot be configured.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let sender: Mailbox = settings
            .sender
            .parse()
            .map_err(|err| NotificationError::invalid_message(format!("sender: {err}")))?;
        let transport = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(|err| NotificationError::delivery(err.to_string()))?
                    .port(settings.port)
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build()
            }
            _ => {
                warn!(host = %settings.host, "SMTP relay configured without credentials; using plaintext");
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                    .port(settings.port)
                    .build()
            }
        };
        Ok(Self { transport, sender })
    }
}

fn reset_body(notice: &PasswordResetNotice) -> String {
    format!(
        "Hello {},\n\nSomeone asked to reset the password for your account.\n\
         Follow this link within {RESET_TOKEN_TTL_MINUTES} minutes to choose a new one:\n\n{}\n\n\
         If this wasn't you, you can ignore this message.\n",
        notice.name, notice.reset_url
    )
}

fn reset_message(sender: &Mailbox, notice: &PasswordResetNotice) -> Result<Message, NotificationError> {
    let address: Address = notice
        .recipient
        .as_ref()
        .parse()
        .map_err(|err| NotificationError::invalid_message(format!("recipient: {err}")))?;
    Message::builder()
        .from(sender.clone())
        .to(Mailbox::new(Some(notice.name.clone()), address))
        .subject(RESET_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(reset_body(notice))
        .map_err(|err| NotificationError::invalid_message(err.to_string()))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_password_reset(
        &self,
        notice: &PasswordResetNotice,
    ) -> Result<(), NotificationError> {
        let message = reset_message(&self.sender, notice)?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| NotificationError::delivery(err.to_string()))
    }
}

/// [`NotificationSender`] that only logs; used when no SMTP relay is
/// configured. The reset link appears in the logs, so keep it to development.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSender;

#[async_trait]
impl NotificationSender for TracingNotificationSender {
    async fn send_password_reset(
        &self,
        notice: &PasswordResetNotice,
    ) -> Result<(), NotificationError> {
        info!(
            recipient = %notice.recipient,
            reset_url = %notice.reset_url,
            "password reset requested; SMTP not configured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::{fixture, rstest};

    #[fixture]
    fn notice() -> PasswordResetNotice {
        PasswordResetNotice {
            recipient: EmailAddress::new("ada@example.com").expect("valid email"),
            name: "Ada".to_owned(),
            reset_url: "http://localhost:3000/reset-password/abc123".to_owned(),
        }
    }

    #[rstest]
    fn reset_message_addresses_the_user(notice: PasswordResetNotice) {
        let sender: Mailbox = "Resto <no-reply@resto.test>".parse().expect("mailbox");

        let message = reset_message(&sender, &notice).expect("message");
        let raw = String::from_utf8(message.formatted()).expect("utf-8");

        assert!(raw.contains("<ada@example.com>"));
        assert!(raw.contains(RESET_SUBJECT));
        assert!(raw.contains("reset-password/abc123"));
    }

    #[rstest]
    fn invalid_sender_is_rejected() {
        let settings = SmtpSettings {
            host: "localhost".to_owned(),
            port: 1025,
            username: None,
            password: None,
            sender: "not an address".to_owned(),
        };
        assert!(matches!(
            SmtpNotificationSender::new(&settings),
            Err(NotificationError::InvalidMessage { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn tracing_sender_always_succeeds(notice: PasswordResetNotice) {
        assert!(
            TracingNotificationSender
                .send_password_reset(&notice)
                .await
                .is_ok()
        );
    }
}
