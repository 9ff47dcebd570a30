//! Island email transport layer
//!
//! Owns the SMTP boundary for the notification mailer:
//!
//! - **SMTP**: lettre `AsyncSmtpTransport` with user-provided credentials
//! - **Mock**: log-only transport for tests and credential-less environments
//!
//! Message composition lives in `island-notify`; this crate only delivers
//! already-assembled messages.

mod config;
mod message;
pub mod mock;
pub mod smtp;

pub use config::SmtpConfig;
pub use message::{Delivery, Outgoing};
pub use mock::MockTransport;
pub use smtp::SmtpTransport;

use thiserror::Error;

/// Errors from transport operations
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Smtp(String),
}

/// Delivery boundary for assembled messages.
///
/// Implementations must be safe for concurrent in-flight sends; the mailer
/// shares one transport across calls.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, email: &Outgoing) -> Result<Delivery, EmailError>;
}
