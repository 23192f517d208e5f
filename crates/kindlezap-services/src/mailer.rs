//! Delivery of converted books over SMTP with STARTTLS.

use async_trait::async_trait;
use kindlezap_core::{AppError, DeliveryEnvelope, SmtpConfig, EPUB_CONTENT_TYPE};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address {address:?}: {message}")]
    Address { address: String, message: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("SMTP send failed: {0}")]
    Smtp(String),
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        AppError::Delivery(err.to_string())
    }
}

/// Sends one delivery envelope as a single message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, envelope: DeliveryEnvelope) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP relay. One connection per message, no retries.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();

        tracing::info!(
            host = %config.host,
            port = config.port,
            "Mailer initialized (SMTP with STARTTLS)"
        );

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, envelope: DeliveryEnvelope) -> Result<(), DeliveryError> {
        let attachments = envelope.attachments.len();
        let message = build_message(&envelope)?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!(error = %e, "SMTP delivery failed");
            DeliveryError::Smtp(e.to_string())
        })?;

        tracing::info!(attachments, "Delivery email sent");
        Ok(())
    }
}

/// Parse a mailbox such as `reader@kindle.com` or `Reader <reader@kindle.com>`.
pub fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::Address {
            address: address.to_string(),
            message: e.to_string(),
        })
}

/// Build the MIME message: a short text part followed by one part per EPUB.
pub fn build_message(envelope: &DeliveryEnvelope) -> Result<Message, DeliveryError> {
    let from = parse_mailbox(&envelope.sender)?;
    let to = parse_mailbox(&envelope.recipient)?;
    let content_type = ContentType::parse(EPUB_CONTENT_TYPE)
        .map_err(|e| DeliveryError::Message(e.to_string()))?;

    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(body_text(envelope)));
    for attachment in &envelope.attachments {
        // Always base64, whatever bytes the book happens to contain
        let data =
            Body::new_with_encoding(attachment.data.clone(), ContentTransferEncoding::Base64)
                .map_err(|_| {
                    DeliveryError::Message(format!("cannot encode {}", attachment.filename))
                })?;
        body = body.singlepart(
            Attachment::new(attachment.filename.clone()).body(data, content_type.clone()),
        );
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(envelope.subject.clone())
        .multipart(body)
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

fn body_text(envelope: &DeliveryEnvelope) -> String {
    let names = envelope
        .attachments
        .iter()
        .map(|a| format!("- {}", a.filename))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Your converted book is attached.\n\n{}\n", names)
}
