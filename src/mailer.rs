//! Outbound mail.
//!
//! Three transports: `Console` logs the message, `Memory` keeps it in an
//! outbox (tests), `Smtp` delivers through lettre. Every transport builds a
//! real `lettre::Message`, so malformed addresses fail the same way
//! everywhere.

use std::sync::{Arc, Mutex};

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

use crate::config::{MailBackend, MailConfig};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("SMTP transport is not configured")]
    MissingSmtpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
enum Transport {
    Console,
    Memory(Arc<Mutex<Vec<OutgoingMail>>>),
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
}

#[derive(Clone)]
pub struct Mailer {
    transport: Transport,
    from_address: String,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let transport = match config.backend {
            MailBackend::Console => Transport::Console,
            MailBackend::Memory => Transport::Memory(Arc::default()),
            MailBackend::Smtp => {
                let smtp = config.smtp.as_ref().ok_or(MailError::MissingSmtpConfig)?;
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
                        .port(smtp.port);
                if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
                    builder =
                        builder.credentials(Credentials::new(username.clone(), password.clone()));
                }
                Transport::Smtp(builder.build())
            }
        };
        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    pub fn console(from_address: impl Into<String>) -> Self {
        Self {
            transport: Transport::Console,
            from_address: from_address.into(),
        }
    }

    pub fn memory(from_address: impl Into<String>) -> Self {
        Self {
            transport: Transport::Memory(Arc::default()),
            from_address: from_address.into(),
        }
    }

    /// Messages captured by the memory transport. Empty for other transports.
    pub fn outbox(&self) -> Vec<OutgoingMail> {
        match &self.transport {
            Transport::Memory(outbox) => outbox
                .lock()
                .map(|outbox| outbox.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?;
        let recipient: Mailbox = to
            .parse()
            .map_err(|_| MailError::InvalidAddress(to.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        match &self.transport {
            Transport::Console => {
                tracing::info!(to = %to, subject = %subject, body = %body, "email (console transport)");
            }
            Transport::Memory(outbox) => {
                if let Ok(mut outbox) = outbox.lock() {
                    outbox.push(OutgoingMail {
                        to: to.to_string(),
                        subject: subject.to_string(),
                        body: body.to_string(),
                    });
                }
            }
            Transport::Smtp(mailer) => {
                mailer.send(message).await?;
                tracing::info!(to = %to, subject = %subject, "email sent");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_transport_captures_messages() {
        let mailer = Mailer::memory("no-reply@example.com");
        mailer
            .send("eater@example.com", "Order #1 Confirmation", "Thanks")
            .await
            .unwrap();
        let outbox = mailer.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].subject, "Order #1 Confirmation");
    }

    #[tokio::test]
    async fn invalid_recipient_is_an_error() {
        let mailer = Mailer::memory("no-reply@example.com");
        let err = mailer.send("not an address", "s", "b").await.unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
        assert!(mailer.outbox().is_empty());
    }

    #[test]
    fn smtp_backend_requires_settings() {
        let config = MailConfig {
            backend: MailBackend::Smtp,
            from_address: "no-reply@example.com".into(),
            smtp: None,
        };
        assert!(matches!(
            Mailer::from_config(&config),
            Err(MailError::MissingSmtpConfig)
        ));
    }
}
