//! One-time token collaborator
//!
//! Reset links carry a single-use token minted by the persistence layer.
//! That layer lives outside this component; the mailer only consumes the
//! token value it returns.

use thiserror::Error;

/// Token minting failed in the persistence layer
#[derive(Error, Debug)]
#[error("token creation failed: {0}")]
pub struct TokenError(pub String);

/// Mints single-use tokens bound to a member
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Create and persist a token for `member_id`, returning its value
    async fn create_token(&self, member_id: &str) -> Result<String, TokenError>;
}
