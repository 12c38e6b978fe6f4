//! services/api/src/adapters/email.rs
//!
//! Implementations of the `NotificationService` port. `SmtpNotifier` delivers
//! through an SMTP relay with lettre; `LogNotifier` only writes a log line and
//! is used when no relay is configured.

use async_trait::async_trait;
use eventify_core::ports::{NotificationService, PortError, PortResult};
use lettre::{
    message::header::ContentType,
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpConfig;

#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotifier {
    /// Builds a STARTTLS transport. No connection is made until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl NotificationService for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> PortResult<()> {
        let email = Message::builder()
            .from(self.from_address.parse().map_err(|_| {
                PortError::Unexpected(format!("Invalid sender address: {}", self.from_address))
            })?)
            .to(recipient.parse().map_err(|_| {
                PortError::Unexpected(format!("Invalid recipient address: {}", recipient))
            })?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!(to = %recipient, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Stand-in for local development: records what would have been sent.
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> PortResult<()> {
        info!(to = %recipient, subject = %subject, "SMTP not configured, email not sent");
        Ok(())
    }
}
