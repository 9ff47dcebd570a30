//! Log-only transport for tests and environments without SMTP credentials

use crate::{Delivery, EmailError, Outgoing, Transport};

/// Transport that logs intent and always succeeds.
///
/// Substituted for the SMTP transport once, at mailer construction, when
/// the `mock` flag is set. Never touches the network.
#[derive(Debug, Default)]
pub struct MockTransport;

impl MockTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn deliver(&self, email: &Outgoing) -> Result<Delivery, EmailError> {
        log::info!("Mock email to {}: {}", email.to, email.subject);

        Ok(Delivery {
            to: email.to.clone(),
        })
    }
}
