//! Outgoing message types

/// An assembled email, ready for delivery.
///
/// Ephemeral per call; never persisted.
#[derive(Debug, Clone)]
pub struct Outgoing {
    /// Recipient, `Display Name <addr@host>` or a bare address
    pub to: String,
    /// Sender address
    pub from: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text: Option<String>,
    /// HTML alternative body
    pub html: Option<String>,
}

/// Receipt for a completed delivery
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Recipient the message was accepted for
    pub to: String,
}
