//! Alert delivery
//!
//! - [`AlertMailer`] trait used by the forwarder
//! - [`SmtpAlertMailer`] sending through an SMTP relay (works with the SES
//!   SMTP interface)

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::email::AlertEmail;
use crate::error::Result;

/// Sends composed alert e-mails.
#[async_trait]
pub trait AlertMailer: Send + Sync {
    /// Deliver the e-mail, returning the id reported by the server.
    async fn send(&self, email: &AlertEmail) -> Result<String>;
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// STARTTLS when true, plain connection otherwise
    pub starttls: bool,
}

pub struct SmtpAlertMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpAlertMailer {
    pub fn new(settings: &SmtpSettings, source: &str, destination: &str) -> Result<Self> {
        let from: Mailbox = source.parse()?;
        let to: Mailbox = destination.parse()?;

        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let mut builder = builder.port(settings.port);
        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        info!(
            host = %settings.host,
            port = settings.port,
            starttls = settings.starttls,
            destination = %destination,
            "SmtpAlertMailer initialized"
        );

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    fn build_message(&self, email: &AlertEmail) -> Result<Message> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?)
    }
}

#[async_trait]
impl AlertMailer for SmtpAlertMailer {
    async fn send(&self, email: &AlertEmail) -> Result<String> {
        let message = self.build_message(email)?;
        let response = self.transport.send(message).await?;
        Ok(response.message().collect::<Vec<_>>().join(" "))
    }
}
