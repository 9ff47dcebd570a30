//! SMTP delivery via lettre

use crate::{Delivery, EmailError, Outgoing, SmtpConfig, Transport};
use lettre::message::{header::ContentType, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

/// Transport backed by `lettre::AsyncSmtpTransport<Tokio1Executor>`
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build the lettre transport once, up front.
    ///
    /// Connection problems at send time surface per call as
    /// `EmailError::Smtp`.
    pub fn connect(config: &SmtpConfig) -> Result<Self, EmailError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = if config.ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| EmailError::Smtp(format!("SMTP relay error: {}", e)))?
                .credentials(creds)
                .port(config.port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .credentials(creds)
                .port(config.port)
                .build()
        };

        Ok(Self { mailer })
    }
}

#[async_trait::async_trait]
impl Transport for SmtpTransport {
    async fn deliver(&self, email: &Outgoing) -> Result<Delivery, EmailError> {
        let message = build_message(email)?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| EmailError::Smtp(format!("SMTP send failed: {}", e)))?;

        log::info!("Email sent to {}", email.to);

        Ok(Delivery {
            to: email.to.clone(),
        })
    }
}

/// Build a `lettre::Message` from an outgoing email.
///
/// A message with both bodies becomes a `multipart/alternative`; an
/// HTML-only message a single HTML part; otherwise a plain text body.
fn build_message(email: &Outgoing) -> Result<Message, EmailError> {
    let builder = Message::builder()
        .from(
            email
                .from
                .parse()
                .map_err(|e| EmailError::Address(format!("invalid from address: {}", e)))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|e| EmailError::Address(format!("invalid to address: {}", e)))?)
        .subject(&email.subject);

    match (&email.html, &email.text) {
        (Some(html), Some(text)) => builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
        ),
        (Some(html), None) => builder.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html.clone()),
        ),
        (None, text) => builder.body(text.clone().unwrap_or_default()),
    }
    .map_err(|e| EmailError::Build(format!("failed to build email: {}", e)))
}
