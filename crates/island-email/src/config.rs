//! Transport configuration

use serde::{Deserialize, Serialize};

/// SMTP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP port (587 for STARTTLS, 465 for implicit TLS, 25 for plaintext)
    #[serde(default = "default_port")]
    pub port: u16,
    /// SMTP username
    pub user: String,
    /// SMTP password
    pub password: String,
    /// Use TLS; disable only for local SMTP servers like Mailpit
    #[serde(default = "default_ssl")]
    pub ssl: bool,
}

fn default_port() -> u16 {
    587
}

fn default_ssl() -> bool {
    true
}

impl SmtpConfig {
    /// Create a config with the usual STARTTLS defaults
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            user: user.into(),
            password: password.into(),
            ssl: default_ssl(),
        }
    }
}
