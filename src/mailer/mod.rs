//! Outbound account email: a thin capability over an SMTP relay configured
//! from the environment. Templating lives with the callers.


use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Missing mail configuration: {0}")]
    MissingVar(&'static str),
    #[error("Invalid mail configuration: {0}")]
    InvalidVar(String),
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Mail message could not be built: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("Mail transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP relay settings, supplied by the runtime environment.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl MailerConfig {
    /// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, and
    /// `MAIL_FROM` from the process environment. `SMTP_PORT` defaults to the
    /// submission port.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MailError> {
        let require = |key: &'static str| lookup(key).ok_or(MailError::MissingVar(key));

        let port = match lookup("SMTP_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                MailError::InvalidVar(format!("SMTP_PORT is not a port number: {raw}"))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host: require("SMTP_HOST")?,
            port,
            username: require("SMTP_USERNAME")?,
            password: require("SMTP_PASSWORD")?,
            sender: require("MAIL_FROM")?,
        })
    }
}

/// Sends HTML mail through the configured relay.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl Mailer {
    pub fn new(config: &MailerConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender: config.sender.parse()?,
        })
    }

    /// Sends one HTML message and returns the provider's acknowledgement as
    /// the message identifier. Errors propagate as-is; nothing retries.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: String,
    ) -> Result<String, MailError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)?;

        let response = self.transport.send(message).await?;
        let message_id = response.message().collect::<Vec<_>>().join(" ");

        debug!("Mail to [{to}] accepted: {message_id}");

        Ok(message_id)
    }
}
